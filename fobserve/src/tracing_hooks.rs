//! Tracing-based observability hooks for failover, tool runtime, and chat turns.
//!
//! ```rust
//! use fchat::ChatRuntimeHooks;
//! use fobserve::TracingObservabilityHooks;
//!
//! fn accepts_chat_hooks(_hooks: &dyn ChatRuntimeHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_chat_hooks(&hooks);
//! ```

use std::time::Duration;

use fchat::{ChatError, ChatRuntimeHooks};
use fcommon::ConversationId;
use fprovider::{ProviderError, ProviderOperationHooks, ToolCall};
use ftooling::{ToolExecutionContext, ToolResolution, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ProviderOperationHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, endpoint: &str, position: usize, attempt: u32) {
        tracing::debug!(
            phase = "provider",
            event = "attempt_start",
            endpoint,
            position,
            attempt
        );
    }

    fn on_failover(&self, from: &str, to: &str, error: &ProviderError) {
        tracing::warn!(
            phase = "provider",
            event = "failover",
            from,
            to,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_success(&self, endpoint: &str, attempts: u32, elapsed: Duration) {
        tracing::info!(
            phase = "provider",
            event = "success",
            endpoint,
            attempts,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_failure(&self, endpoint: &str, attempts: u32, error: &ProviderError) {
        tracing::error!(
            phase = "provider",
            event = "failure",
            endpoint,
            attempts,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_tool_requested(&self, call: &ToolCall, context: &ToolExecutionContext) {
        tracing::info!(
            phase = "tool",
            event = "requested",
            tool_name = call.name,
            tool_call_id = call.id,
            round_trip = context.round_trip,
            conversation_id = %context.conversation_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str())
        );
    }

    fn on_tool_resolved(
        &self,
        call: &ToolCall,
        context: &ToolExecutionContext,
        resolution: ToolResolution<'_>,
        elapsed: Duration,
    ) {
        let elapsed_ms = elapsed.as_millis() as u64;
        let trace_id = context.trace_id.as_ref().map(|id| id.as_str());
        match resolution.error() {
            None => tracing::info!(
                phase = "tool",
                event = "resolved",
                outcome = resolution.label(),
                tool_name = call.name,
                round_trip = context.round_trip,
                conversation_id = %context.conversation_id,
                trace_id,
                elapsed_ms
            ),
            Some(error) => tracing::warn!(
                phase = "tool",
                event = "resolved",
                outcome = resolution.label(),
                tool_name = call.name,
                round_trip = context.round_trip,
                conversation_id = %context.conversation_id,
                trace_id,
                elapsed_ms,
                error_kind = error.kind.as_str(),
                retryable = error.is_retryable(),
                error = %error
            ),
        }
    }
}

impl ChatRuntimeHooks for TracingObservabilityHooks {
    fn on_turn_start(&self, conversation_id: &ConversationId, history_len: usize) {
        tracing::debug!(
            phase = "chat",
            event = "turn_start",
            conversation_id = %conversation_id,
            history_len
        );
    }

    fn on_history_trimmed(&self, conversation_id: &ConversationId, removed: usize, cost: usize) {
        tracing::info!(
            phase = "chat",
            event = "history_trimmed",
            conversation_id = %conversation_id,
            removed,
            cost
        );
    }

    fn on_tool_round_trip(
        &self,
        conversation_id: &ConversationId,
        tool_name: &str,
        round_trip: usize,
        error: Option<&ChatError>,
    ) {
        match error {
            Some(error) => tracing::warn!(
                phase = "chat",
                event = "tool_round_trip",
                conversation_id = %conversation_id,
                tool_name,
                round_trip,
                error = %error
            ),
            None => tracing::debug!(
                phase = "chat",
                event = "tool_round_trip",
                conversation_id = %conversation_id,
                tool_name,
                round_trip
            ),
        }
    }

    fn on_command(&self, conversation_id: &ConversationId, command: &str) {
        tracing::info!(
            phase = "chat",
            event = "command",
            conversation_id = %conversation_id,
            command
        );
    }

    fn on_turn_complete(
        &self,
        conversation_id: &ConversationId,
        round_trips: usize,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "chat",
            event = "turn_complete",
            conversation_id = %conversation_id,
            round_trips,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_turn_failure(&self, conversation_id: &ConversationId, error: &ChatError, elapsed: Duration) {
        if error.is_user_error() {
            tracing::info!(
                phase = "chat",
                event = "turn_rejected",
                conversation_id = %conversation_id,
                error = %error
            );
            return;
        }

        tracing::error!(
            phase = "chat",
            event = "turn_failure",
            conversation_id = %conversation_id,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_stale_commit_discarded(&self, conversation_id: &ConversationId) {
        tracing::warn!(
            phase = "chat",
            event = "stale_commit_discarded",
            conversation_id = %conversation_id
        );
    }
}
