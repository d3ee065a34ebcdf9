//! HTTP-backed tool collaborators.
//!
//! An [`HttpJsonTool`] POSTs the model's arguments as JSON to a configured
//! URL and hands the response body back as the tool result.

use std::time::Duration;

use fprovider::ToolDefinition;
use ftooling::{Tool, ToolError, ToolExecutionContext, ToolFuture};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::config::ToolConfig;

pub const DEFAULT_HTTP_TOOL_TIMEOUT: Duration = Duration::from_secs(20);
pub const CONVERSATION_HEADER: &str = "x-conversation-id";

const ERROR_BODY_LIMIT: usize = 200;

#[derive(Debug, Clone)]
pub struct HttpJsonTool {
    definition: ToolDefinition,
    url: String,
    timeout: Duration,
    client: Client,
}

impl HttpJsonTool {
    pub fn new(definition: ToolDefinition, url: impl Into<String>) -> Self {
        Self {
            definition,
            url: url.into(),
            timeout: DEFAULT_HTTP_TOOL_TIMEOUT,
            client: Client::new(),
        }
    }

    pub fn from_config(config: &ToolConfig) -> Self {
        let definition = ToolDefinition::new(
            config.name.clone(),
            config.description.clone(),
            config.parameter_schema.clone(),
        );
        let tool = Self::new(definition, config.url.clone());
        match config.timeout_secs {
            Some(seconds) => tool.with_timeout(Duration::from_secs(seconds)),
            None => tool,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, args: Value, context: &ToolExecutionContext) -> Result<Value, ToolError> {
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .header(CONVERSATION_HEADER, context.conversation_id.as_str())
            .json(&args)
            .send()
            .await
            .map_err(|err| self.request_error(err))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.request_error(err))?;

        if !status.is_success() {
            return Err(self.status_error(status, &body));
        }

        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }

    fn request_error(&self, err: reqwest::Error) -> ToolError {
        let name = &self.definition.name;
        let error = if err.is_timeout() {
            ToolError::timeout(format!("tool '{name}' did not answer within {:?}", self.timeout))
        } else {
            ToolError::execution(format!("tool '{name}' request failed: {err}"))
        };
        error.with_tool_name(name.clone())
    }

    fn status_error(&self, status: StatusCode, body: &str) -> ToolError {
        let name = &self.definition.name;
        let snippet: String = body.chars().take(ERROR_BODY_LIMIT).collect();
        let message = format!("tool '{name}' answered {status}: {snippet}");
        let error = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ToolError::unauthorized(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ToolError::invalid_arguments(message)
            }
            _ => ToolError::execution(message),
        };
        error.with_tool_name(name.clone())
    }
}

impl Tool for HttpJsonTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn invoke<'a>(
        &'a self,
        args: Value,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<Value, ToolError>> {
        Box::pin(self.call(args, context))
    }
}
