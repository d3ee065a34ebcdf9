//! Capability layer for registering and executing tools.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use fprovider::{ToolCall, ToolDefinition};
//! use ftooling::{DefaultToolRuntime, ToolExecutionContext, ToolRegistry, ToolRuntime};
//!
//! let mut registry = ToolRegistry::new();
//! registry
//!     .register_sync_fn(
//!         ToolDefinition::new("echo", "Echoes input", r#"{"type":"object"}"#),
//!         |args, _ctx| Ok(args),
//!     )
//!     .expect("echo should register");
//!
//! let tools = DefaultToolRuntime::new(Arc::new(registry));
//! let executor = tokio::runtime::Builder::new_current_thread()
//!     .build()
//!     .expect("runtime should build");
//! let result = executor.block_on(tools.execute(
//!     ToolCall::new("call_0", "echo", r#"{"text":"hi"}"#),
//!     ToolExecutionContext::new("P100"),
//! ));
//! assert_eq!(result.content(), r#"{"text":"hi"}"#);
//! ```

mod args;
mod error;
mod hooks;
mod registry;
mod runtime;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        DefaultToolRuntime, FunctionTool, Tool, ToolError, ToolErrorKind, ToolExecutionContext,
        ToolExecutionResult, ToolFuture, ToolRegistry, ToolResolution, ToolRuntime,
    };
}

pub use args::{as_object, parse_call_arguments, required_string};
pub use error::{ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolResolution, ToolRuntimeHooks};
pub use registry::ToolRegistry;
pub use runtime::{DEFAULT_TOOL_TIMEOUT, DefaultToolRuntime, ToolRuntime};
pub use tool::{FunctionTool, Tool, ToolFuture};
pub use types::{ToolExecutionContext, ToolExecutionResult};
