//! Chat-assistant bridge between messaging gateways and OpenAI-compatible
//! model endpoints.
//!
//! This crate re-exports the workspace crates and wires them together from a
//! TOML configuration: priority failover across endpoints, HTTP tool
//! collaborators, and the conversation service with tracing hooks attached.
//!
//! ```rust,no_run
//! use fbridge::{BridgeConfig, build_bridge};
//!
//! # async fn run() -> Result<(), fbridge::BridgeError> {
//! let config = BridgeConfig::load("fbridge.toml")?;
//! let bridge = build_bridge(&config)?;
//!
//! let reply = bridge.converse(fbridge::ConversationId::group(5, 200), "hello").await;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

mod error;

pub mod cli;
pub mod config;
pub mod prelude;
pub mod runtime;
pub mod tools;

pub use fchat;
pub use fcommon;
pub use fobserve;
pub use fprovider;
pub use ftooling;

pub use config::{BridgeConfig, ChatConfig, EndpointConfig, ToolConfig};
pub use error::{BridgeError, BridgeErrorKind};
pub use runtime::{Bridge, build_bridge, build_bridge_with, build_tool_runtime};
pub use tools::HttpJsonTool;

pub use fchat::{
    BudgetEvictor, CharCountEstimator, ChatError, ChatErrorKind, ChatPolicy, ChatRuntimeHooks,
    ChatService, ChatServiceBuilder, CostEstimator, ReservedCommand, SessionStore,
};
pub use fcommon::{ConversationId, GenerationOptions, TraceId};
pub use fobserve::{
    MetricsObservabilityHooks, SafeChatHooks, SafeProviderHooks, SafeToolHooks,
    TracingObservabilityHooks,
};
pub use fprovider::{
    Endpoint, EndpointRegistry, EndpointTransport, FailoverClient, FailoverCursor, Message,
    ModelProvider, ModelRequest, ModelResponse, ProviderError, ProviderErrorKind, Role,
    ToolCall, ToolDefinition,
};
pub use ftooling::{
    DefaultToolRuntime, FunctionTool, Tool, ToolError, ToolErrorKind, ToolExecutionContext,
    ToolRegistry, ToolRuntime,
};
