//! Tool runtime trait and default registry-backed executor.

use std::sync::Arc;
use std::time::{Duration, Instant};

use fprovider::{ToolCall, ToolDefinition};
use futures_timer::Delay;
use futures_util::future::{Either, select};
use serde_json::Value;

use crate::{
    NoopToolRuntimeHooks, ToolError, ToolExecutionContext, ToolExecutionResult, ToolFuture,
    ToolRegistry, ToolResolution, ToolRuntimeHooks, parse_call_arguments,
};

pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolves tool calls into results.
///
/// `execute` never fails: unknown tools, bad arguments and tool errors all
/// come back as an error payload in the [`ToolExecutionResult`].
pub trait ToolRuntime: Send + Sync {
    fn definitions(&self) -> Vec<ToolDefinition>;

    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, ToolExecutionResult>;
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    registry: Arc<ToolRegistry>,
    hooks: Arc<dyn ToolRuntimeHooks>,
    timeout: Option<Duration>,
}

impl Default for DefaultToolRuntime {
    fn default() -> Self {
        Self::new(Arc::new(ToolRegistry::new()))
    }
}

impl DefaultToolRuntime {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            hooks: Arc::new(NoopToolRuntimeHooks),
            timeout: Some(DEFAULT_TOOL_TIMEOUT),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// `None` lets tools run without a deadline.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    async fn invoke(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
    ) -> Result<Value, ToolError> {
        let tool = self
            .registry
            .get(&tool_call.name)
            .ok_or_else(|| ToolError::unsupported_tool(&tool_call.name))?;
        let args = parse_call_arguments(&tool_call.arguments)?;
        let invocation = tool.invoke(args, context);

        let Some(limit) = self.timeout else {
            return invocation.await;
        };

        match select(invocation, Delay::new(limit)).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(ToolError::timeout(format!(
                "tool '{}' did not finish within {limit:?}",
                tool_call.name
            ))),
        }
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, ToolExecutionResult> {
        Box::pin(async move {
            let started = Instant::now();
            self.hooks.on_tool_requested(&tool_call, &context);

            match self.invoke(&tool_call, &context).await {
                Ok(payload) => {
                    let result = ToolExecutionResult::success(&tool_call, payload);
                    self.hooks.on_tool_resolved(
                        &tool_call,
                        &context,
                        ToolResolution::Completed(&result),
                        started.elapsed(),
                    );
                    result
                }
                Err(error) => {
                    let error = error
                        .with_tool_name(tool_call.name.clone())
                        .with_tool_call_id(tool_call.id.clone());
                    self.hooks.on_tool_resolved(
                        &tool_call,
                        &context,
                        ToolResolution::from_error(&error),
                        started.elapsed(),
                    );
                    ToolExecutionResult::from_error(&tool_call, &error)
                }
            }
        })
    }
}
