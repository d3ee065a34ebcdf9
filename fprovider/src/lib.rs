//! Provider endpoints, failover and wire adapters for chat-completion backends.
//!
//! An [`EndpointRegistry`] holds the priority-ordered endpoints loaded at
//! startup. A [`FailoverClient`] sends each request through an
//! [`EndpointTransport`] to the endpoint under its [`FailoverCursor`], moving
//! the cursor forward on transient failures.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use fprovider::{
//!     Endpoint, EndpointRegistry, EndpointTransport, FailoverClient, FailoverCursor, Message,
//!     ModelRequest, ModelResponse, OutputItem, ProviderError, ProviderFuture, StopReason,
//!     TokenUsage,
//! };
//!
//! #[derive(Debug)]
//! struct EchoTransport;
//!
//! impl EndpointTransport for EchoTransport {
//!     fn complete<'a>(
//!         &'a self,
//!         endpoint: &'a Endpoint,
//!         request: ModelRequest,
//!     ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
//!         Box::pin(async move {
//!             Ok(ModelResponse {
//!                 endpoint: endpoint.label().to_string(),
//!                 model: request.model,
//!                 output: vec![OutputItem::Message(Message::assistant("echo"))],
//!                 stop_reason: StopReason::EndTurn,
//!                 usage: TokenUsage::default(),
//!             })
//!         })
//!     }
//! }
//!
//! let registry = EndpointRegistry::new(vec![Endpoint::new("https://a.example/v1", "sk", 0)])
//!     .expect("registry should load");
//! let client = FailoverClient::new(
//!     Arc::new(registry),
//!     Arc::new(EchoTransport),
//!     Arc::new(FailoverCursor::new()),
//! );
//! assert_eq!(client.cursor(), 0);
//! ```

pub mod adapters;
pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod failover;
pub mod model;
pub mod provider;

pub use credentials::SecretString;
pub use endpoint::{DEFAULT_ENDPOINT_TIMEOUT, Endpoint, EndpointRegistry};
pub use error::{FailureClass, ProviderError, ProviderErrorKind};
pub use failover::{FailoverClient, FailoverCursor, NoopOperationHooks, ProviderOperationHooks};
pub use model::{
    Message, ModelRequest, ModelResponse, OutputItem, Role, StopReason,
    TokenUsage, ToolCall, ToolDefinition, function_pairing_is_valid,
};
pub use provider::{EndpointTransport, ModelProvider, ProviderFuture};
