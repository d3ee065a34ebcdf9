use std::future::Future;
use std::pin::Pin;

use crate::{Endpoint, ModelRequest, ModelResponse, ProviderError};

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Something that turns a request into a model completion.
///
/// The failover client implements this, which lets the chat layer run
/// against a scripted provider in tests.
pub trait ModelProvider: Send + Sync {
    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>>;
}

/// Wire-level call against one specific endpoint.
///
/// Implementations map their failures onto [`crate::ProviderErrorKind`] so the
/// failover client can classify them.
pub trait EndpointTransport: Send + Sync + std::fmt::Debug {
    fn complete<'a>(
        &'a self,
        endpoint: &'a Endpoint,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>>;
}
