//! Failures raised while resolving a tool call.
//!
//! A `ToolError` never ends a turn. The runtime folds it into the function
//! message the model reads next, as `{"error": {"kind", "message"}}`, so the
//! model can answer without the tool or try a different one. Only
//! [`ToolErrorKind::Registration`] surfaces outside a turn, while the
//! registry is being assembled at startup.
//!
//! ```rust
//! use ftooling::ToolError;
//!
//! let error = ToolError::unsupported_tool("search_music");
//! assert_eq!(error.payload()["error"]["kind"], "unsupported_tool");
//! assert_eq!(error.payload()["error"]["message"], "tool 'search_music' is not supported");
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    /// The model asked for a tool name the registry does not hold.
    UnsupportedTool,
    /// The call's `arguments` text is not a JSON object.
    InvalidArguments,
    /// The tool ran and reported a failure, e.g. an upstream HTTP error.
    Execution,
    /// The tool outlived the configured per-call limit.
    Timeout,
    /// The upstream behind the tool rejected our credentials.
    Unauthorized,
    /// Duplicate or malformed definition at registry build time.
    Registration,
}

impl ToolErrorKind {
    /// Label written to `error.kind` in the payload.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnsupportedTool => "unsupported_tool",
            Self::InvalidArguments => "invalid_arguments",
            Self::Execution => "execution_failed",
            Self::Timeout => "timeout",
            Self::Unauthorized => "unauthorized",
            Self::Registration => "registration",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
    /// Filled in by the runtime once the failing call is known.
    pub tool_name: Option<String>,
    pub tool_call_id: Option<String>,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            tool_name: None,
            tool_call_id: None,
        }
    }

    pub fn unsupported_tool(tool_name: &str) -> Self {
        Self::new(
            ToolErrorKind::UnsupportedTool,
            format!("tool '{tool_name}' is not supported"),
        )
        .with_tool_name(tool_name)
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArguments, message)
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Execution, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Timeout, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Unauthorized, message)
    }

    pub fn registration(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Registration, message)
    }

    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    pub fn with_tool_call_id(mut self, tool_call_id: impl Into<String>) -> Self {
        self.tool_call_id = Some(tool_call_id.into());
        self
    }

    /// A timed out call may succeed if the model asks again; nothing else will.
    pub fn is_retryable(&self) -> bool {
        self.kind == ToolErrorKind::Timeout
    }

    pub fn is_unsupported(&self) -> bool {
        self.kind == ToolErrorKind::UnsupportedTool
    }

    /// The function message body the model sees in place of a tool result.
    /// Tool name and call id stay out of it; the message already carries both.
    pub fn payload(&self) -> Value {
        json!({
            "error": {
                "kind": self.kind.as_str(),
                "message": self.message,
            }
        })
    }
}

impl Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)?;
        match (&self.tool_name, &self.tool_call_id) {
            (Some(tool_name), Some(tool_call_id)) => write!(f, " ({tool_name}, {tool_call_id})"),
            (Some(tool_name), None) => write!(f, " ({tool_name})"),
            (None, Some(tool_call_id)) => write!(f, " ({tool_call_id})"),
            (None, None) => Ok(()),
        }
    }
}

impl Error for ToolError {}
