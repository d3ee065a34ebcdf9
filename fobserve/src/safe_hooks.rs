use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use fchat::{ChatError, ChatRuntimeHooks};
use fcommon::ConversationId;
use fprovider::{ProviderError, ProviderOperationHooks, ToolCall};
use ftooling::{ToolExecutionContext, ToolResolution, ToolRuntimeHooks};

pub struct SafeProviderHooks<H> {
    inner: H,
}

impl<H> SafeProviderHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ProviderOperationHooks for SafeProviderHooks<H>
where
    H: ProviderOperationHooks,
{
    fn on_attempt_start(&self, endpoint: &str, position: usize, attempt: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_attempt_start(endpoint, position, attempt)
        }));
    }

    fn on_failover(&self, from: &str, to: &str, error: &ProviderError) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_failover(from, to, error)));
    }

    fn on_success(&self, endpoint: &str, attempts: u32, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_success(endpoint, attempts, elapsed)
        }));
    }

    fn on_failure(&self, endpoint: &str, attempts: u32, error: &ProviderError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_failure(endpoint, attempts, error)
        }));
    }
}

pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_tool_requested(&self, call: &ToolCall, context: &ToolExecutionContext) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_tool_requested(call, context)
        }));
    }

    fn on_tool_resolved(
        &self,
        call: &ToolCall,
        context: &ToolExecutionContext,
        resolution: ToolResolution<'_>,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_tool_resolved(call, context, resolution, elapsed)
        }));
    }
}

pub struct SafeChatHooks<H> {
    inner: H,
}

impl<H> SafeChatHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ChatRuntimeHooks for SafeChatHooks<H>
where
    H: ChatRuntimeHooks,
{
    fn on_turn_start(&self, conversation_id: &ConversationId, history_len: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_start(conversation_id, history_len)
        }));
    }

    fn on_history_trimmed(&self, conversation_id: &ConversationId, removed: usize, cost: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_history_trimmed(conversation_id, removed, cost)
        }));
    }

    fn on_tool_round_trip(
        &self,
        conversation_id: &ConversationId,
        tool_name: &str,
        round_trip: usize,
        error: Option<&ChatError>,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_tool_round_trip(conversation_id, tool_name, round_trip, error)
        }));
    }

    fn on_command(&self, conversation_id: &ConversationId, command: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_command(conversation_id, command)
        }));
    }

    fn on_turn_complete(
        &self,
        conversation_id: &ConversationId,
        round_trips: usize,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_turn_complete(conversation_id, round_trips, elapsed)
        }));
    }

    fn on_turn_failure(&self, conversation_id: &ConversationId, error: &ChatError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_failure(conversation_id, error, elapsed)
        }));
    }

    fn on_stale_commit_discarded(&self, conversation_id: &ConversationId) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_stale_commit_discarded(conversation_id)
        }));
    }
}
