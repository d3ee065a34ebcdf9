//! Metrics-based observability hooks for failover, tool runtime, and chat turns.
//!
//! ```rust
//! use fobserve::MetricsObservabilityHooks;
//! use fprovider::ProviderOperationHooks;
//!
//! fn accepts_provider_hooks(_hooks: &dyn ProviderOperationHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_provider_hooks(&hooks);
//! ```

use std::time::Duration;

use fchat::{ChatError, ChatRuntimeHooks};
use fcommon::ConversationId;
use fprovider::{ProviderError, ProviderOperationHooks, ToolCall};
use ftooling::{ToolExecutionContext, ToolResolution, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ProviderOperationHooks for MetricsObservabilityHooks {
    fn on_attempt_start(&self, endpoint: &str, _position: usize, _attempt: u32) {
        metrics::counter!(
            "fbridge_provider_attempt_start_total",
            "endpoint" => endpoint.to_string()
        )
        .increment(1);
    }

    fn on_failover(&self, from: &str, to: &str, error: &ProviderError) {
        metrics::counter!(
            "fbridge_provider_failover_total",
            "from" => from.to_string(),
            "to" => to.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }

    fn on_success(&self, endpoint: &str, attempts: u32, elapsed: Duration) {
        metrics::counter!(
            "fbridge_provider_success_total",
            "endpoint" => endpoint.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "fbridge_provider_attempts_per_success",
            "endpoint" => endpoint.to_string()
        )
        .record(attempts as f64);
        metrics::histogram!(
            "fbridge_provider_duration_seconds",
            "endpoint" => endpoint.to_string()
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_failure(&self, endpoint: &str, _attempts: u32, error: &ProviderError) {
        metrics::counter!(
            "fbridge_provider_failure_total",
            "endpoint" => endpoint.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }
}

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_tool_requested(&self, call: &ToolCall, context: &ToolExecutionContext) {
        metrics::counter!(
            "fbridge_tool_requested_total",
            "tool_name" => call.name.clone()
        )
        .increment(1);
        metrics::histogram!("fbridge_tool_round_trip_index").record(context.round_trip as f64);
    }

    fn on_tool_resolved(
        &self,
        call: &ToolCall,
        _context: &ToolExecutionContext,
        resolution: ToolResolution<'_>,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "fbridge_tool_resolved_total",
            "tool_name" => call.name.clone(),
            "outcome" => resolution.label()
        )
        .increment(1);
        metrics::histogram!(
            "fbridge_tool_duration_seconds",
            "tool_name" => call.name.clone(),
            "outcome" => resolution.label()
        )
        .record(elapsed.as_secs_f64());
    }
}

impl ChatRuntimeHooks for MetricsObservabilityHooks {
    fn on_turn_start(&self, _conversation_id: &ConversationId, history_len: usize) {
        metrics::counter!("fbridge_chat_turn_start_total").increment(1);
        metrics::histogram!("fbridge_chat_history_messages").record(history_len as f64);
    }

    fn on_history_trimmed(&self, _conversation_id: &ConversationId, removed: usize, _cost: usize) {
        metrics::counter!("fbridge_chat_history_evicted_messages_total").increment(removed as u64);
    }

    fn on_tool_round_trip(
        &self,
        _conversation_id: &ConversationId,
        tool_name: &str,
        _round_trip: usize,
        error: Option<&ChatError>,
    ) {
        let status = if error.is_some() { "error" } else { "ok" };
        metrics::counter!(
            "fbridge_chat_tool_round_trip_total",
            "tool_name" => tool_name.to_string(),
            "status" => status
        )
        .increment(1);
    }

    fn on_command(&self, _conversation_id: &ConversationId, command: &str) {
        metrics::counter!("fbridge_chat_command_total", "command" => command.to_string())
            .increment(1);
    }

    fn on_turn_complete(
        &self,
        _conversation_id: &ConversationId,
        round_trips: usize,
        elapsed: Duration,
    ) {
        metrics::counter!("fbridge_chat_turn_complete_total").increment(1);
        metrics::histogram!("fbridge_chat_tool_round_trips_per_turn").record(round_trips as f64);
        metrics::histogram!("fbridge_chat_turn_duration_seconds", "status" => "success")
            .record(elapsed.as_secs_f64());
    }

    fn on_turn_failure(&self, _conversation_id: &ConversationId, error: &ChatError, elapsed: Duration) {
        metrics::counter!(
            "fbridge_chat_turn_failure_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!("fbridge_chat_turn_duration_seconds", "status" => "failure")
            .record(elapsed.as_secs_f64());
    }

    fn on_stale_commit_discarded(&self, _conversation_id: &ConversationId) {
        metrics::counter!("fbridge_chat_stale_commit_discarded_total").increment(1);
    }
}
