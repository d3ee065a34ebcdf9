//! Chat-layer errors and classification.
//!
//! ```rust
//! use fchat::{ChatError, ChatErrorKind};
//! use fprovider::ProviderError;
//!
//! let exhausted = ChatError::from(ProviderError::endpoints_exhausted("all endpoints failed"));
//! assert_eq!(exhausted.kind, ChatErrorKind::ProviderTransient);
//! assert!(exhausted.user_message().contains("temporarily unavailable"));
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use fprovider::{FailureClass, ProviderError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidArgument,
    ProviderTransient,
    ProviderPermanent,
    ToolUnavailable,
    DepthExceeded,
    Store,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidArgument, message)
    }

    pub fn provider_transient(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::ProviderTransient, message)
    }

    pub fn provider_permanent(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::ProviderPermanent, message)
    }

    pub fn tool_unavailable(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::ToolUnavailable, message)
    }

    pub fn depth_exceeded(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::DepthExceeded, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Store, message)
    }

    pub fn is_user_error(&self) -> bool {
        self.kind == ChatErrorKind::InvalidArgument
    }

    /// Text shown to the person chatting when a turn fails.
    pub fn user_message(&self) -> String {
        match self.kind {
            ChatErrorKind::InvalidArgument => format!("Invalid input: {}", self.message),
            ChatErrorKind::ProviderTransient => {
                "Service temporarily unavailable, please try again later.".to_string()
            }
            ChatErrorKind::ProviderPermanent => {
                format!("The model service rejected the request: {}", self.message)
            }
            ChatErrorKind::ToolUnavailable => {
                format!("A tool needed for this request is unavailable: {}", self.message)
            }
            ChatErrorKind::DepthExceeded => "Sorry, I was unable to complete this request.".to_string(),
            ChatErrorKind::Store => {
                "Something went wrong with this conversation, please try again.".to_string()
            }
        }
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

impl From<ProviderError> for ChatError {
    fn from(value: ProviderError) -> Self {
        if value.is_exhausted() || value.failure_class() == FailureClass::Transient {
            ChatError::provider_transient(value.to_string())
        } else {
            ChatError::provider_permanent(value.message)
        }
    }
}
