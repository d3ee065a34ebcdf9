//! Runtime wiring: configuration in, ready-to-use conversation service out.

use std::sync::Arc;

use fchat::ChatService;
use fcommon::ConversationId;
use fobserve::{SafeChatHooks, SafeProviderHooks, SafeToolHooks, TracingObservabilityHooks};
use fprovider::{Endpoint, EndpointRegistry, EndpointTransport, FailoverClient, FailoverCursor};
use ftooling::{DefaultToolRuntime, ToolRegistry};

use crate::{BridgeConfig, BridgeError, HttpJsonTool};

/// Assembled service plus the handles operators usually want to inspect.
#[derive(Debug, Clone)]
pub struct Bridge {
    chat: ChatService,
    failover: FailoverClient,
    preset: String,
}

impl Bridge {
    pub fn chat(&self) -> &ChatService {
        &self.chat
    }

    pub fn failover(&self) -> &FailoverClient {
        &self.failover
    }

    pub fn preset(&self) -> &str {
        &self.preset
    }

    /// Answers one inbound message using the configured default persona.
    pub async fn converse(&self, conversation_id: impl Into<ConversationId>, text: &str) -> String {
        self.chat.converse(conversation_id, &self.preset, text).await
    }
}

/// Builds a bridge that talks to the configured endpoints over HTTP, reading
/// `credential_env` values from the process environment.
#[cfg(feature = "provider-openai")]
pub fn build_bridge(config: &BridgeConfig) -> Result<Bridge, BridgeError> {
    let endpoints = config.resolve_endpoints_from_env()?;
    let transport = Arc::new(fprovider::adapters::openai::ChatCompletionsTransport::default());
    build_bridge_with(config, endpoints, transport)
}

#[cfg(not(feature = "provider-openai"))]
pub fn build_bridge(_config: &BridgeConfig) -> Result<Bridge, BridgeError> {
    Err(BridgeError::assembly(
        "provider-openai feature is not enabled on fbridge",
    ))
}

pub fn build_bridge_with(
    config: &BridgeConfig,
    endpoints: Vec<Endpoint>,
    transport: Arc<dyn EndpointTransport>,
) -> Result<Bridge, BridgeError> {
    config.validate()?;

    let registry = Arc::new(EndpointRegistry::new(endpoints)?);
    let failover = FailoverClient::new(registry, transport, Arc::new(FailoverCursor::new()))
        .with_hooks(Arc::new(SafeProviderHooks::new(TracingObservabilityHooks)));

    let chat = ChatService::builder(Arc::new(failover.clone()))
        .tool_runtime(build_tool_runtime(config)?)
        .hooks(Arc::new(SafeChatHooks::new(TracingObservabilityHooks)))
        .policy(config.chat.to_policy()?)
        .build();

    Ok(Bridge {
        chat,
        failover,
        preset: config.chat.preset.clone(),
    })
}

pub fn build_tool_runtime(config: &BridgeConfig) -> Result<Arc<DefaultToolRuntime>, BridgeError> {
    config.validate()?;

    let mut registry = ToolRegistry::new();
    for tool in &config.tools {
        registry.register(HttpJsonTool::from_config(tool))?;
    }

    let runtime = DefaultToolRuntime::new(Arc::new(registry))
        .with_hooks(Arc::new(SafeToolHooks::new(TracingObservabilityHooks)));
    Ok(Arc::new(runtime))
}
