//! Chat-completions payload serde models and conversion helpers.
//!
//! Requests use the `functions` / `function_call` form of function calling,
//! where a tool result is sent back as a `function` role message carrying the
//! tool name. Responses in the newer `tool_calls` form are accepted as well.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Message, ModelRequest, ModelResponse, OutputItem, ProviderError, Role, StopReason,
    TokenUsage, ToolCall, ToolDefinition,
};

pub(crate) fn build_api_request(
    model_override: Option<&str>,
    request: ModelRequest,
) -> Result<ChatApiRequest, ProviderError> {
    if request.messages.is_empty() {
        return Err(ProviderError::invalid_request(
            "chat completion requires at least one message",
        ));
    }

    let messages = request
        .messages
        .into_iter()
        .map(ChatApiMessage::from)
        .collect::<Vec<_>>();

    let functions = if request.tools.is_empty() {
        None
    } else {
        Some(
            request
                .tools
                .into_iter()
                .map(ChatApiFunction::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        )
    };

    Ok(ChatApiRequest {
        model: model_override
            .map(str::to_string)
            .unwrap_or(request.model),
        messages,
        functions,
        temperature: request.options.temperature,
        max_tokens: request.options.max_tokens,
    })
}

pub(crate) fn parse_finish_reason(value: Option<&str>) -> StopReason {
    match value {
        Some("stop") => StopReason::EndTurn,
        Some("length") => StopReason::MaxTokens,
        Some("function_call") | Some("tool_calls") => StopReason::ToolUse,
        Some("cancelled") => StopReason::Cancelled,
        _ => StopReason::Other,
    }
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ChatApiErrorEnvelope>(body).ok()?;
    Some(parsed.error.message)
}

/// Maps a non-success HTTP status onto the provider error taxonomy.
pub(crate) fn classify_status(status: u16, message: String) -> ProviderError {
    match status {
        401 | 403 => ProviderError::authentication(message),
        429 => ProviderError::rate_limited(message),
        408 | 504 => ProviderError::timeout(message),
        400 | 404 | 422 => ProviderError::invalid_request(message),
        500..=599 => ProviderError::unavailable(message),
        _ => ProviderError::other(message),
    }
}

pub(crate) fn into_model_response(
    endpoint: &str,
    requested_model: &str,
    value: ChatApiResponse,
) -> Result<ModelResponse, ProviderError> {
    let choice = value.choices.into_iter().next().ok_or_else(|| {
        ProviderError::other(format!("endpoint '{endpoint}' returned no choices"))
    })?;

    let tool_call = match (choice.message.function_call, choice.message.tool_calls) {
        (Some(call), _) => Some(ToolCall::new("call_0", call.name, call.arguments)),
        (None, Some(calls)) => calls
            .into_iter()
            .next()
            .map(|call| ToolCall::new(call.id, call.function.name, call.function.arguments)),
        (None, None) => None,
    };

    let mut output = Vec::new();
    if let Some(content) = choice.message.content.filter(|content| !content.is_empty()) {
        output.push(OutputItem::Message(Message::assistant(content)));
    }

    let mut stop_reason = parse_finish_reason(choice.finish_reason.as_deref());
    if let Some(call) = tool_call {
        output.push(OutputItem::ToolCall(call));
        stop_reason = StopReason::ToolUse;
    }

    let usage = value.usage.unwrap_or_default();

    Ok(ModelResponse {
        endpoint: endpoint.to_string(),
        model: value.model.unwrap_or_else(|| requested_model.to_string()),
        output,
        stop_reason,
        usage: TokenUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        },
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatApiErrorEnvelope {
    pub error: ChatApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatApiError {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatApiRequest {
    pub model: String,
    pub messages: Vec<ChatApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<ChatApiFunction>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatApiMessage {
    pub role: &'static str,
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<ChatApiFunctionCall>,
}

impl From<Message> for ChatApiMessage {
    fn from(value: Message) -> Self {
        let name = match value.role {
            Role::Function => value.name,
            _ => None,
        };

        Self {
            role: value.role.as_str(),
            content: value.content,
            name,
            function_call: value.tool_call.map(|call| ChatApiFunctionCall {
                name: call.name,
                arguments: call.arguments,
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ChatApiFunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatApiFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl TryFrom<ToolDefinition> for ChatApiFunction {
    type Error = ProviderError;

    fn try_from(value: ToolDefinition) -> Result<Self, Self::Error> {
        let parameters = serde_json::from_str::<Value>(&value.parameter_schema).map_err(|_| {
            ProviderError::invalid_request(format!(
                "parameter schema for function '{}' must be valid JSON",
                value.name
            ))
        })?;

        Ok(Self {
            name: value.name,
            description: value.description,
            parameters,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatApiResponse {
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<ChatApiChoice>,
    #[serde(default)]
    pub usage: Option<ChatApiUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatApiChoice {
    pub message: ChatApiAssistantMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatApiAssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub function_call: Option<ChatApiFunctionCall>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ChatApiToolCall>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatApiToolCall {
    pub id: String,
    pub function: ChatApiFunctionCall,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChatApiUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}
