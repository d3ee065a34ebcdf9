//! Common imports for bridge applications.

pub use crate::{Bridge, BridgeConfig, BridgeError, HttpJsonTool, build_bridge, build_bridge_with};
pub use crate::{
    ChatError, ChatPolicy, ChatService, ConversationId, Endpoint, FailoverClient, FailoverCursor,
    Message, ModelProvider, ReservedCommand, Role, SessionStore, Tool, ToolDefinition, ToolError,
    ToolExecutionContext, ToolRegistry,
};
