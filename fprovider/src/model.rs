//! Provider-agnostic request, response, and message model types.
//!
//! ```rust
//! use fprovider::{Message, ModelRequest, ProviderErrorKind, ToolCall};
//!
//! let ok = ModelRequest::new(
//!     "gpt-4o-mini",
//!     vec![Message::system("You are a helpful assistant."), Message::user("hello")],
//! );
//! assert!(ok.validate().is_ok());
//!
//! let orphan = ModelRequest::new(
//!     "gpt-4o-mini",
//!     vec![Message::user("hi"), Message::function("search_music", "{}")],
//! )
//! .validate()
//! .expect_err("function result without a preceding call should fail");
//! assert_eq!(orphan.kind, ProviderErrorKind::InvalidRequest);
//!
//! let paired = vec![
//!     Message::user("play abc"),
//!     Message::assistant_tool_call(ToolCall::new("call_0", "search_music", r#"{"keyword":"abc"}"#)),
//!     Message::function("search_music", r#"{"name":"abc"}"#),
//! ];
//! assert!(fprovider::function_pairing_is_valid(&paired));
//! ```

use fcommon::{GenerationOptions, MetadataMap};

use crate::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    System,
    User,
    Assistant,
    Function,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Function => "function",
        }
    }
}

/// One transcript entry.
///
/// `content` is `None` for an assistant message that only carries a
/// `tool_call`. Function-role messages carry the invoked tool's `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: Option<String>,
    pub name: Option<String>,
    pub tool_call: Option<ToolCall>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            name: None,
            tool_call: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn assistant_tool_call(tool_call: ToolCall) -> Self {
        Self {
            role: Role::Assistant,
            content: None,
            name: None,
            tool_call: Some(tool_call),
        }
    }

    pub fn function(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Function,
            content: Some(content.into()),
            name: Some(name.into()),
            tool_call: None,
        }
    }

    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    pub fn requested_tool(&self) -> Option<&str> {
        match (&self.role, &self.tool_call) {
            (Role::Assistant, Some(call)) => Some(call.name.as_str()),
            _ => None,
        }
    }
}

/// Returns `true` when every function-role message directly follows an
/// assistant message whose tool call names the same tool.
pub fn function_pairing_is_valid(messages: &[Message]) -> bool {
    messages.iter().enumerate().all(|(index, message)| {
        if message.role != Role::Function {
            return true;
        }

        let Some(name) = message.name.as_deref() else {
            return false;
        };

        index
            .checked_sub(1)
            .and_then(|previous| messages[previous].requested_tool())
            .is_some_and(|requested| requested == name)
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameter_schema: String,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameter_schema: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameter_schema: parameter_schema.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputItem {
    Message(Message),
    ToolCall(ToolCall),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
    Cancelled,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResponse {
    /// Name of the endpoint that produced the response.
    pub endpoint: String,
    pub model: String,
    pub output: Vec<OutputItem>,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

impl ModelResponse {
    pub fn text(&self) -> String {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::Message(message) if message.role == Role::Assistant => {
                    Some(message.text())
                }
                _ => None,
            })
            .collect()
    }

    pub fn tool_call(&self) -> Option<&ToolCall> {
        self.output.iter().find_map(|item| match item {
            OutputItem::ToolCall(call) => Some(call),
            OutputItem::Message(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub options: GenerationOptions,
    pub tools: Vec<ToolDefinition>,
    pub metadata: MetadataMap,
}

impl ModelRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: GenerationOptions::default(),
            tools: Vec::new(),
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one message is required",
            ));
        }

        if !function_pairing_is_valid(&self.messages) {
            return Err(ProviderError::invalid_request(
                "function results must directly follow the assistant call that requested them",
            ));
        }

        if let Some(max_tokens) = self.options.max_tokens
            && max_tokens == 0
        {
            return Err(ProviderError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        if let Some(temperature) = self.options.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ProviderError::invalid_request(
                "temperature must be in the inclusive range 0.0..=2.0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorKind;

    #[test]
    fn validate_enforces_request_contract() {
        let empty_model = ModelRequest::new("   ", vec![Message::user("hi")]);
        let err = empty_model.validate().expect_err("empty model must fail");
        assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);

        let empty_messages = ModelRequest::new("gpt", Vec::new());
        assert!(empty_messages.validate().is_err());

        let bad_temperature = ModelRequest::new("gpt", vec![Message::user("hi")]).with_temperature(2.5);
        assert!(bad_temperature.validate().is_err());

        let mut bad_max_tokens = ModelRequest::new("gpt", vec![Message::user("hi")]);
        bad_max_tokens.options.max_tokens = Some(0);
        assert!(bad_max_tokens.validate().is_err());

        let valid = ModelRequest::new("gpt", vec![Message::user("hi")])
            .with_temperature(0.4)
            .with_metadata("conversation_id", "P100");
        assert!(valid.validate().is_ok());
        assert_eq!(
            valid.metadata.get("conversation_id"),
            Some(&"P100".to_string())
        );
    }

    #[test]
    fn function_pairing_requires_matching_assistant_call() {
        let call = ToolCall::new("call_0", "search_music", "{}");

        let mismatched = vec![
            Message::assistant_tool_call(call.clone()),
            Message::function("translate", "{}"),
        ];
        assert!(!function_pairing_is_valid(&mismatched));

        let separated = vec![
            Message::assistant_tool_call(call.clone()),
            Message::user("interleaved"),
            Message::function("search_music", "{}"),
        ];
        assert!(!function_pairing_is_valid(&separated));

        let mut unnamed = Message::function("search_music", "{}");
        unnamed.name = None;
        assert!(!function_pairing_is_valid(&[
            Message::assistant_tool_call(call.clone()),
            unnamed
        ]));

        let paired = vec![
            Message::system("preset"),
            Message::assistant_tool_call(call),
            Message::function("search_music", "{}"),
        ];
        assert!(function_pairing_is_valid(&paired));
    }

    #[test]
    fn response_helpers_collect_text_and_first_tool_call() {
        let response = ModelResponse {
            endpoint: "primary".to_string(),
            model: "gpt".to_string(),
            output: vec![
                OutputItem::Message(Message::assistant("hello ")),
                OutputItem::Message(Message::assistant("world")),
                OutputItem::ToolCall(ToolCall::new("call_0", "search_internet", "{}")),
            ],
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        };

        assert_eq!(response.text(), "hello world");
        assert_eq!(
            response.tool_call().map(|call| call.name.as_str()),
            Some("search_internet")
        );
    }
}
