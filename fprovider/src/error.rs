//! Shared provider error kinds, failover classification and error helpers.
//!
//! ```rust
//! use fprovider::{FailureClass, ProviderError};
//!
//! let auth = ProviderError::authentication("bad key");
//! assert!(!auth.retryable);
//! assert_eq!(auth.failure_class(), FailureClass::Transient);
//!
//! let invalid = ProviderError::invalid_request("unsupported model");
//! assert_eq!(invalid.failure_class(), FailureClass::Permanent);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Authentication,
    RateLimited,
    InvalidRequest,
    Timeout,
    Transport,
    Unavailable,
    EndpointsExhausted,
    Other,
}

/// How the failover client reacts to an error from the active endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Connectivity, timeout, credential and rate-limit failures. The cursor
    /// advances to the next endpoint and the call is retried there.
    Transient,
    /// Everything else. Returned to the caller, cursor untouched.
    Permanent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Authentication, message, false)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::RateLimited, message, true)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidRequest, message, false)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Timeout, message, true)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transport, message, true)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unavailable, message, true)
    }

    pub fn endpoints_exhausted(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::EndpointsExhausted, message, false)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Other, message, false)
    }

    pub fn failure_class(&self) -> FailureClass {
        match self.kind {
            ProviderErrorKind::Authentication
            | ProviderErrorKind::RateLimited
            | ProviderErrorKind::Timeout
            | ProviderErrorKind::Transport => FailureClass::Transient,
            ProviderErrorKind::InvalidRequest
            | ProviderErrorKind::Unavailable
            | ProviderErrorKind::EndpointsExhausted
            | ProviderErrorKind::Other => FailureClass::Permanent,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.kind == ProviderErrorKind::EndpointsExhausted
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ProviderError {}
