//! reqwest-based chat-completions transport for OpenAI-compatible endpoints.

use reqwest::{Client, Response};

use crate::{Endpoint, EndpointTransport, ModelRequest, ModelResponse, ProviderError, ProviderFuture};

use super::serde_api::{
    ChatApiResponse, build_api_request, classify_status, extract_error_message,
    into_model_response,
};

#[derive(Debug, Clone, Default)]
pub struct ChatCompletionsTransport {
    client: Client,
}

impl ChatCompletionsTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub(crate) fn completions_url(endpoint: &Endpoint) -> String {
        format!("{}/chat/completions", endpoint.url.trim_end_matches('/'))
    }

    async fn parse_error(endpoint: &Endpoint, response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body).unwrap_or_else(|| {
            format!(
                "endpoint '{}' request failed with status {status}",
                endpoint.label()
            )
        });

        classify_status(status.as_u16(), message)
    }
}

impl EndpointTransport for ChatCompletionsTransport {
    fn complete<'a>(
        &'a self,
        endpoint: &'a Endpoint,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            let requested_model = endpoint
                .model
                .clone()
                .unwrap_or_else(|| request.model.clone());
            let api_request = build_api_request(endpoint.model.as_deref(), request)?;

            let mut builder = self
                .client
                .post(Self::completions_url(endpoint))
                .timeout(endpoint.timeout)
                .json(&api_request);
            if endpoint.has_credential() {
                builder = builder.bearer_auth(endpoint.credential.expose());
            }

            let response = builder.send().await.map_err(|err| {
                if err.is_timeout() {
                    ProviderError::timeout(err.to_string())
                } else {
                    ProviderError::transport(err.to_string())
                }
            })?;

            if !response.status().is_success() {
                return Err(Self::parse_error(endpoint, response).await);
            }

            let parsed: ChatApiResponse = response.json().await.map_err(|err| {
                if err.is_decode() {
                    ProviderError::other(format!(
                        "endpoint '{}' returned an unreadable body: {err}",
                        endpoint.label()
                    ))
                } else {
                    ProviderError::transport(err.to_string())
                }
            })?;

            into_model_response(endpoint.label(), &requested_model, parsed)
        })
    }
}
