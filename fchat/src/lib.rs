//! Conversation sessions and per-turn orchestration over model providers.
//!
//! A [`ChatService`] owns a [`SessionStore`], trims history with a
//! [`BudgetEvictor`] and drives each turn through a [`ToolDispatchLoop`].
//! Reserved commands are answered locally without calling a provider.

mod budget;
mod commands;
mod dispatch;
mod error;
mod hooks;
mod service;
mod store;

pub mod prelude {
    pub use crate::{
        BudgetEvictor, CharCountEstimator, ChatError, ChatErrorKind, ChatPolicy,
        ChatRuntimeHooks, ChatService, ChatServiceBuilder, CostEstimator, ReservedCommand,
        Session, SessionStore,
    };
    pub use fcommon::{ConversationId, MetadataMap, TraceId};
    pub use ftooling::{
        DefaultToolRuntime, Tool, ToolError, ToolErrorKind, ToolExecutionContext,
        ToolExecutionResult, ToolRegistry, ToolRuntime,
    };
}

pub use budget::{
    BudgetEvictor, CharCountEstimator, CostEstimator, MESSAGE_OVERHEAD_COST, REPLY_PRIMING_COST,
    Trimmed,
};
pub use commands::{
    HELP_REPLY, RESET_CONVERSATION_REPLY, RESET_PERSONA_REPLY, ReservedCommand, SET_PERSONA_REPLY,
};
pub use dispatch::{
    DEFAULT_MAX_TOOL_ROUND_TRIPS, DispatchOutcome, DispatchRequest, DispatchState,
    ToolDispatchLoop,
};
pub use error::{ChatError, ChatErrorKind};
pub use hooks::{ChatRuntimeHooks, NoopChatRuntimeHooks};
pub use service::{ChatPolicy, ChatService, ChatServiceBuilder, DEFAULT_MAX_COST, DEFAULT_MODEL};
pub use store::{Session, SessionStore, TurnGuard};
pub use fcommon::{ConversationId, MetadataMap, TraceId};
pub use ftooling::{
    DefaultToolRuntime, Tool, ToolError, ToolErrorKind, ToolExecutionContext, ToolExecutionResult,
    ToolRegistry, ToolRuntime,
};
