//! Tool runtime context and execution result types.

use fcommon::{ConversationId, MetadataMap, TraceId};
use fprovider::{Message, ToolCall};
use serde_json::Value;

use crate::ToolError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolExecutionContext {
    pub conversation_id: ConversationId,
    pub trace_id: Option<TraceId>,
    /// Tool round trip within the turn, starting at 1. Zero outside a turn.
    pub round_trip: usize,
    pub metadata: MetadataMap,
}

impl ToolExecutionContext {
    pub fn new(conversation_id: impl Into<ConversationId>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            trace_id: None,
            round_trip: 0,
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_round_trip(mut self, round_trip: usize) -> Self {
        self.round_trip = round_trip;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Outcome of one tool call, successful or not.
///
/// Failures are carried as an `{"error": {"kind", "message"}}` payload so the
/// model always receives a result it can react to.
///
/// ```rust
/// use fprovider::ToolCall;
/// use ftooling::{ToolError, ToolExecutionResult};
///
/// let call = ToolCall::new("call_0", "search_music", r#"{"keyword":"abc"}"#);
/// let result = ToolExecutionResult::from_error(&call, &ToolError::unsupported_tool("search_music"));
///
/// assert!(result.is_error);
/// assert_eq!(result.payload["error"]["kind"], "unsupported_tool");
/// assert_eq!(result.to_message().name.as_deref(), Some("search_music"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ToolExecutionResult {
    pub tool_call_id: String,
    pub tool_name: String,
    pub payload: Value,
    pub is_error: bool,
}

impl ToolExecutionResult {
    pub fn success(call: &ToolCall, payload: Value) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            payload,
            is_error: false,
        }
    }

    pub fn from_error(call: &ToolCall, error: &ToolError) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            payload: error.payload(),
            is_error: true,
        }
    }

    /// JSON text of the payload, as appended to the transcript.
    pub fn content(&self) -> String {
        self.payload.to_string()
    }

    pub fn to_message(&self) -> Message {
        Message::function(self.tool_name.clone(), self.content())
    }
}
