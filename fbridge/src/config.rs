//! TOML configuration for the bridge.
//!
//! ```rust
//! use fbridge::BridgeConfig;
//!
//! let config = BridgeConfig::from_toml_str(
//!     r#"
//!     [chat]
//!     preset = "You are a helpful assistant."
//!     max_cost = 2000
//!
//!     [[endpoints]]
//!     url = "https://api.openai.com/v1"
//!     credential = "sk-example"
//!     "#,
//! )
//! .expect("config should parse");
//!
//! assert_eq!(config.chat.max_cost, 2000);
//! assert_eq!(config.chat.model, "gpt-3.5-turbo");
//! assert_eq!(config.endpoints.len(), 1);
//! ```

use std::path::Path;
use std::time::Duration;

use chrono::FixedOffset;
use fchat::{ChatPolicy, DEFAULT_MAX_COST, DEFAULT_MAX_TOOL_ROUND_TRIPS, DEFAULT_MODEL};
use fcommon::GenerationOptions;
use fprovider::{DEFAULT_ENDPOINT_TIMEOUT, Endpoint};
use serde::Deserialize;

use crate::BridgeError;

pub const DEFAULT_PRESET: &str = "You are a helpful assistant.";
pub const DEFAULT_TOOL_SCHEMA: &str = r#"{"type":"object"}"#;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
    #[serde(default)]
    pub tools: Vec<ToolConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChatConfig {
    pub preset: String,
    pub model: String,
    pub max_cost: usize,
    pub max_tool_round_trips: usize,
    pub temperature: Option<f32>,
    /// Reply length cap forwarded to the endpoint as `max_tokens`.
    pub max_tokens: Option<u32>,
    pub time_context_utc_offset_hours: Option<i32>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            preset: DEFAULT_PRESET.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_cost: DEFAULT_MAX_COST,
            max_tool_round_trips: DEFAULT_MAX_TOOL_ROUND_TRIPS,
            temperature: None,
            max_tokens: None,
            time_context_utc_offset_hours: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    pub name: Option<String>,
    pub url: String,
    pub credential: Option<String>,
    pub credential_env: Option<String>,
    #[serde(default)]
    pub priority: u32,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default = "default_tool_schema")]
    pub parameter_schema: String,
    pub timeout_secs: Option<u64>,
}

fn default_tool_schema() -> String {
    DEFAULT_TOOL_SCHEMA.to_string()
}

impl BridgeConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            BridgeError::io(format!("failed to read '{}': {err}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, BridgeError> {
        let config: Self = toml::from_str(raw).map_err(|err| BridgeError::parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BridgeError> {
        self.chat.validate()?;

        if self.endpoints.is_empty() {
            return Err(BridgeError::validation(
                "at least one [[endpoints]] entry is required",
            ));
        }

        for (position, endpoint) in self.endpoints.iter().enumerate() {
            if endpoint.url.trim().is_empty() {
                return Err(BridgeError::validation(format!(
                    "endpoint at position {position} has an empty url"
                )));
            }
            if endpoint.credential.is_some() && endpoint.credential_env.is_some() {
                return Err(BridgeError::validation(format!(
                    "endpoint '{}' sets both credential and credential_env",
                    endpoint.label()
                )));
            }
            if endpoint.timeout_secs == Some(0) {
                return Err(BridgeError::validation(format!(
                    "endpoint '{}' has a zero timeout",
                    endpoint.label()
                )));
            }
        }

        for tool in &self.tools {
            if tool.url.trim().is_empty() {
                return Err(BridgeError::validation(format!(
                    "tool '{}' has an empty url",
                    tool.name
                )));
            }
            if tool.timeout_secs == Some(0) {
                return Err(BridgeError::validation(format!(
                    "tool '{}' has a zero timeout",
                    tool.name
                )));
            }
        }

        Ok(())
    }

    /// Builds registry entries, resolving `credential_env` through `lookup`.
    pub fn resolve_endpoints<F>(&self, lookup: F) -> Result<Vec<Endpoint>, BridgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.endpoints
            .iter()
            .map(|endpoint| endpoint.resolve(&lookup))
            .collect()
    }

    pub fn resolve_endpoints_from_env(&self) -> Result<Vec<Endpoint>, BridgeError> {
        self.resolve_endpoints(|name| std::env::var(name).ok())
    }
}

impl ChatConfig {
    fn validate(&self) -> Result<(), BridgeError> {
        if self.preset.trim().is_empty() {
            return Err(BridgeError::validation("chat.preset must not be empty"));
        }
        if self.model.trim().is_empty() {
            return Err(BridgeError::validation("chat.model must not be empty"));
        }
        if self.max_cost == 0 {
            return Err(BridgeError::validation("chat.max_cost must be greater than 0"));
        }
        if self.max_tool_round_trips == 0 {
            return Err(BridgeError::validation(
                "chat.max_tool_round_trips must be at least 1",
            ));
        }
        if let Some(temperature) = self.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(BridgeError::validation(
                "chat.temperature must be between 0.0 and 2.0",
            ));
        }
        if self.max_tokens == Some(0) {
            return Err(BridgeError::validation(
                "chat.max_tokens must be greater than 0",
            ));
        }
        self.time_context_offset()?;
        Ok(())
    }

    pub fn time_context_offset(&self) -> Result<Option<FixedOffset>, BridgeError> {
        self.time_context_utc_offset_hours
            .map(|hours| {
                FixedOffset::east_opt(hours.saturating_mul(3600)).ok_or_else(|| {
                    BridgeError::validation(format!(
                        "chat.time_context_utc_offset_hours {hours} is out of range"
                    ))
                })
            })
            .transpose()
    }

    pub fn to_policy(&self) -> Result<ChatPolicy, BridgeError> {
        let mut options = GenerationOptions::default();
        if let Some(temperature) = self.temperature {
            options = options.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            options = options.with_max_tokens(max_tokens);
        }

        Ok(ChatPolicy {
            model: self.model.clone(),
            max_cost: self.max_cost,
            max_tool_round_trips: self.max_tool_round_trips,
            options,
            time_context_offset: self.time_context_offset()?,
        })
    }
}

impl EndpointConfig {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.url.as_str())
    }

    fn resolve<F>(&self, lookup: &F) -> Result<Endpoint, BridgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credential = match (&self.credential, &self.credential_env) {
            (_, Some(variable)) => lookup(variable)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| {
                    BridgeError::validation(format!(
                        "endpoint '{}' expects credential in ${variable}, which is unset or empty",
                        self.label()
                    ))
                })?,
            (Some(credential), None) => credential.clone(),
            (None, None) => String::new(),
        };

        let timeout = self
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_ENDPOINT_TIMEOUT);
        let mut endpoint = Endpoint::new(self.url.clone(), credential, self.priority).with_timeout(timeout);
        if let Some(name) = &self.name {
            endpoint = endpoint.with_name(name.clone());
        }
        if let Some(model) = &self.model {
            endpoint = endpoint.with_model(model.clone());
        }
        Ok(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BridgeErrorKind;

    const FULL: &str = r#"
        [chat]
        preset = "You are a helpful assistant."
        model = "gpt-3.5-turbo"
        max_cost = 3000
        max_tool_round_trips = 4
        temperature = 0.7
        max_tokens = 512
        time_context_utc_offset_hours = 8

        [[endpoints]]
        name = "primary"
        url = "https://api.openai.com/v1"
        credential_env = "PRIMARY_KEY"
        priority = 0
        model = "gpt-4o-mini"
        timeout_secs = 30

        [[endpoints]]
        url = "https://backup.example/v1"
        credential = "sk-backup"
        priority = 1

        [[tools]]
        name = "search_internet"
        description = "Search the internet"
        url = "https://search.example/api"
        parameter_schema = '{"type":"object","properties":{"query":{"type":"string"}},"required":["query"]}'
        timeout_secs = 20
    "#;

    fn lookup(name: &str) -> Option<String> {
        (name == "PRIMARY_KEY").then(|| "sk-primary".to_string())
    }

    #[test]
    fn full_config_parses_and_resolves() {
        let config = BridgeConfig::from_toml_str(FULL).expect("config should parse");

        assert_eq!(config.chat.temperature, Some(0.7));
        assert_eq!(config.tools[0].name, "search_internet");

        let endpoints = config.resolve_endpoints(lookup).expect("endpoints resolve");
        assert_eq!(endpoints[0].label(), "primary");
        assert!(endpoints[0].has_credential());
        assert_eq!(endpoints[0].model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(endpoints[0].timeout, Duration::from_secs(30));
        assert_eq!(endpoints[1].label(), "https://backup.example/v1");
        assert_eq!(endpoints[1].timeout, DEFAULT_ENDPOINT_TIMEOUT);

        let policy = config.chat.to_policy().expect("policy");
        assert_eq!(policy.options.temperature, Some(0.7));
        assert_eq!(policy.options.max_tokens, Some(512));
        assert_eq!(
            policy.time_context_offset.map(|offset| offset.local_minus_utc()),
            Some(8 * 3600)
        );
    }

    #[test]
    fn missing_credential_variable_is_rejected() {
        let config = BridgeConfig::from_toml_str(FULL).expect("config should parse");
        let error = config
            .resolve_endpoints(|_| None)
            .expect_err("unset variable should fail");

        assert_eq!(error.kind, BridgeErrorKind::Validation);
        assert!(error.message.contains("PRIMARY_KEY"));

        let error = config
            .resolve_endpoints(|_| Some("  ".to_string()))
            .expect_err("blank variable should fail");
        assert_eq!(error.kind, BridgeErrorKind::Validation);
    }

    #[test]
    fn validation_rejects_unusable_settings() {
        let cases = [
            ("", "at least one"),
            ("[[endpoints]]\nurl = \" \"", "empty url"),
            (
                "[chat]\nmax_cost = 0\n[[endpoints]]\nurl = \"http://a\"",
                "max_cost",
            ),
            (
                "[chat]\nmax_tool_round_trips = 0\n[[endpoints]]\nurl = \"http://a\"",
                "max_tool_round_trips",
            ),
            (
                "[chat]\ntime_context_utc_offset_hours = 30\n[[endpoints]]\nurl = \"http://a\"",
                "out of range",
            ),
            (
                "[[endpoints]]\nurl = \"http://a\"\ncredential = \"x\"\ncredential_env = \"Y\"",
                "both",
            ),
            (
                "[[endpoints]]\nurl = \"http://a\"\ntimeout_secs = 0",
                "zero timeout",
            ),
            (
                "[chat]\nmax_tokens = 0\n[[endpoints]]\nurl = \"http://a\"",
                "max_tokens",
            ),
            (
                "[[endpoints]]\nurl = \"http://a\"\n[[tools]]\nname = \"search_internet\"\nurl = \"http://s\"\ntimeout_secs = 0",
                "tool 'search_internet' has a zero timeout",
            ),
        ];

        for (raw, needle) in cases {
            let error = BridgeConfig::from_toml_str(raw).expect_err(raw);
            assert_eq!(error.kind, BridgeErrorKind::Validation, "{raw}");
            assert!(error.message.contains(needle), "{raw}: {}", error.message);
        }
    }

    #[test]
    fn malformed_toml_and_unknown_keys_are_parse_errors() {
        let error = BridgeConfig::from_toml_str("[chat").expect_err("broken toml");
        assert_eq!(error.kind, BridgeErrorKind::Parse);

        let error = BridgeConfig::from_toml_str("[chat]\nmodle = \"typo\"")
            .expect_err("unknown key");
        assert_eq!(error.kind, BridgeErrorKind::Parse);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let error = BridgeConfig::load("/definitely/not/here.toml").expect_err("missing file");
        assert_eq!(error.kind, BridgeErrorKind::Io);
    }
}
