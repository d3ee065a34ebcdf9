//! Lifecycle callbacks emitted by the chat service.
//!
//! ```rust
//! use fchat::{ChatRuntimeHooks, NoopChatRuntimeHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn ChatRuntimeHooks) {}
//!
//! assert_hooks_trait(&NoopChatRuntimeHooks);
//! ```

use std::time::Duration;

use fcommon::ConversationId;

use crate::ChatError;

pub trait ChatRuntimeHooks: Send + Sync {
    fn on_turn_start(&self, _conversation_id: &ConversationId, _history_len: usize) {}

    fn on_history_trimmed(&self, _conversation_id: &ConversationId, _removed: usize, _cost: usize) {}

    /// `error` is set when the tool call produced an error payload.
    fn on_tool_round_trip(
        &self,
        _conversation_id: &ConversationId,
        _tool_name: &str,
        _round_trip: usize,
        _error: Option<&ChatError>,
    ) {
    }

    fn on_command(&self, _conversation_id: &ConversationId, _command: &str) {}

    fn on_turn_complete(
        &self,
        _conversation_id: &ConversationId,
        _round_trips: usize,
        _elapsed: Duration,
    ) {
    }

    fn on_turn_failure(
        &self,
        _conversation_id: &ConversationId,
        _error: &ChatError,
        _elapsed: Duration,
    ) {
    }

    fn on_stale_commit_discarded(&self, _conversation_id: &ConversationId) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChatRuntimeHooks;

impl ChatRuntimeHooks for NoopChatRuntimeHooks {}
