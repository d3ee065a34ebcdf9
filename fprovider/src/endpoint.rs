//! Priority-ordered endpoint list loaded once at startup.
//!
//! ```rust
//! use fprovider::{Endpoint, EndpointRegistry};
//!
//! let registry = EndpointRegistry::new(vec![
//!     Endpoint::new("https://backup.example/v1", "sk-b", 20).with_name("backup"),
//!     Endpoint::new("https://primary.example/v1", "sk-a", 10).with_name("primary"),
//! ])
//! .expect("registry should load");
//!
//! assert_eq!(registry.len(), 2);
//! assert_eq!(registry.get(0).map(|endpoint| endpoint.label()), Some("primary"));
//! ```

use std::time::Duration;

use crate::{ProviderError, SecretString};

pub const DEFAULT_ENDPOINT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub url: String,
    pub credential: SecretString,
    pub priority: u32,
    /// Overrides the request model when set.
    pub model: Option<String>,
    pub timeout: Duration,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, credential: impl Into<SecretString>, priority: u32) -> Self {
        Self {
            name: String::new(),
            url: url.into(),
            credential: credential.into(),
            priority,
            model: None,
            timeout: DEFAULT_ENDPOINT_TIMEOUT,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Name for logs and responses, falling back to the url.
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            self.url.as_str()
        } else {
            self.name.as_str()
        }
    }

    pub fn has_credential(&self) -> bool {
        !self.credential.is_empty()
    }
}

/// Immutable endpoint list sorted by ascending priority.
///
/// Endpoints sharing a priority keep their configured order.
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    endpoints: Vec<Endpoint>,
}

impl EndpointRegistry {
    pub fn new(mut endpoints: Vec<Endpoint>) -> Result<Self, ProviderError> {
        if endpoints.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one endpoint must be configured",
            ));
        }

        if let Some(blank) = endpoints.iter().position(|endpoint| endpoint.url.trim().is_empty()) {
            return Err(ProviderError::invalid_request(format!(
                "endpoint at position {blank} has an empty url"
            )));
        }

        if endpoints.iter().any(|endpoint| endpoint.timeout.is_zero()) {
            return Err(ProviderError::invalid_request(
                "endpoint timeout must be greater than zero",
            ));
        }

        endpoints.sort_by_key(|endpoint| endpoint.priority);
        Ok(Self { endpoints })
    }

    pub fn get(&self, position: usize) -> Option<&Endpoint> {
        self.endpoints.get(position)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn last_position(&self) -> usize {
        self.endpoints.len().saturating_sub(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }
}
