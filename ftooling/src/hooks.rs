//! Callbacks fired around each tool call the model makes during a turn.
//!
//! A call always produces one `on_tool_requested` and then one
//! `on_tool_resolved`. The [`ToolResolution`] tells sinks whether the tool
//! answered, was never registered, ran out of time or failed, so an
//! unsupported tool can be counted apart from a broken one.
//!
//! ```rust
//! use ftooling::{ToolError, ToolResolution};
//!
//! let missing = ToolError::unsupported_tool("search_music");
//! let resolution = ToolResolution::from_error(&missing);
//!
//! assert_eq!(resolution.label(), "unsupported");
//! assert!(!resolution.is_completed());
//! ```

use std::time::Duration;

use fprovider::ToolCall;

use crate::{ToolError, ToolErrorKind, ToolExecutionContext, ToolExecutionResult};

#[derive(Debug, Clone, Copy)]
pub enum ToolResolution<'a> {
    Completed(&'a ToolExecutionResult),
    /// The model named a tool that is not registered.
    Unsupported(&'a ToolError),
    TimedOut(&'a ToolError),
    Failed(&'a ToolError),
}

impl<'a> ToolResolution<'a> {
    pub fn from_error(error: &'a ToolError) -> Self {
        match error.kind {
            ToolErrorKind::UnsupportedTool => Self::Unsupported(error),
            ToolErrorKind::Timeout => Self::TimedOut(error),
            _ => Self::Failed(error),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed(_) => "completed",
            Self::Unsupported(_) => "unsupported",
            Self::TimedOut(_) => "timed_out",
            Self::Failed(_) => "failed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn error(&self) -> Option<&'a ToolError> {
        match *self {
            Self::Completed(_) => None,
            Self::Unsupported(error) | Self::TimedOut(error) | Self::Failed(error) => Some(error),
        }
    }
}

/// `context` carries the conversation, the turn's trace id and the tool
/// round trip (1-based) the call belongs to.
pub trait ToolRuntimeHooks: Send + Sync {
    fn on_tool_requested(&self, _call: &ToolCall, _context: &ToolExecutionContext) {}

    fn on_tool_resolved(
        &self,
        _call: &ToolCall,
        _context: &ToolExecutionContext,
        _resolution: ToolResolution<'_>,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}
