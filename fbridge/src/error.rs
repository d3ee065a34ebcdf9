//! Errors raised while loading configuration and assembling the bridge.

use std::error::Error;
use std::fmt::{Display, Formatter};

use fprovider::ProviderError;
use ftooling::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeErrorKind {
    Io,
    Parse,
    Validation,
    Assembly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeError {
    pub kind: BridgeErrorKind,
    pub message: String,
}

impl BridgeError {
    pub fn new(kind: BridgeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(BridgeErrorKind::Io, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(BridgeErrorKind::Parse, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(BridgeErrorKind::Validation, message)
    }

    pub fn assembly(message: impl Into<String>) -> Self {
        Self::new(BridgeErrorKind::Assembly, message)
    }
}

impl Display for BridgeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for BridgeError {}

impl From<ProviderError> for BridgeError {
    fn from(value: ProviderError) -> Self {
        Self::assembly(value.message)
    }
}

impl From<ToolError> for BridgeError {
    fn from(value: ToolError) -> Self {
        Self::assembly(value.message)
    }
}
