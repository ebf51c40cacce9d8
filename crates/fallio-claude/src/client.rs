// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Anthropic Messages API.
//!
//! Handles request construction, authentication headers, and error
//! classification (rate limits are distinguished from other failures).

use std::time::Duration;

use fallio_core::{FallioError, ProviderKind};
use reqwest::StatusCode;
use tracing::debug;

use crate::types::{ApiErrorResponse, MessageRequest, MessageResponse, ModelListResponse};

/// Base URL for the Anthropic API.
const API_BASE_URL: &str = "https://api.anthropic.com";

/// Anthropic API version header value.
const API_VERSION: &str = "2023-06-01";

/// HTTP client for Anthropic API communication.
#[derive(Debug, Clone)]
pub struct ClaudeClient {
    client: reqwest::Client,
    base_url: String,
}

impl ClaudeClient {
    /// Creates a new client. The API key is supplied per request so a
    /// keyless configuration can still be constructed (and reported as a
    /// missing credential at call time).
    pub fn new() -> Result<Self, FallioError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| FallioError::Provider {
                provider: ProviderKind::Claude,
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Sends a non-streaming message request and returns the full response.
    pub async fn complete_message(
        &self,
        api_key: &str,
        request: &MessageRequest,
    ) -> Result<MessageResponse, FallioError> {
        let url = format!("{}/v1/messages", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| FallioError::Provider {
                provider: ProviderKind::Claude,
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, "claude response received");

        if status.is_success() {
            let body = response.text().await.map_err(|e| FallioError::Provider {
                provider: ProviderKind::Claude,
                message: format!("failed to read response body: {e}"),
                source: Some(Box::new(e)),
            })?;
            return serde_json::from_str(&body).map_err(|e| FallioError::Provider {
                provider: ProviderKind::Claude,
                message: format!("failed to parse API response: {e}"),
                source: Some(Box::new(e)),
            });
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status, &body))
    }

    /// Lists model identifiers available to the key, newest first.
    pub async fn list_models(&self, api_key: &str) -> Result<Vec<String>, FallioError> {
        let url = format!("{}/v1/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .send()
            .await
            .map_err(|e| FallioError::Provider {
                provider: ProviderKind::Claude,
                message: format!("model list request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &body));
        }

        let list: ModelListResponse =
            response.json().await.map_err(|e| FallioError::Provider {
                provider: ProviderKind::Claude,
                message: format!("failed to parse model list: {e}"),
                source: Some(Box::new(e)),
            })?;

        let mut ids: Vec<String> = list
            .data
            .into_iter()
            .map(|m| m.id)
            .filter(|id| id.starts_with("claude"))
            .collect();
        ids.sort_unstable();
        ids.reverse();
        Ok(ids)
    }
}

/// Classifies a non-success status into the error taxonomy. 429 becomes
/// a rate-limit error so the horoscope retry path can key on it.
fn classify_error(status: StatusCode, body: &str) -> FallioError {
    let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(body) {
        format!(
            "Anthropic API error ({}): {}",
            api_err.error.type_, api_err.error.message
        )
    } else {
        format!("API returned {status}: {body}")
    };

    if status == StatusCode::TOO_MANY_REQUESTS {
        FallioError::RateLimited {
            provider: ProviderKind::Claude,
            message,
        }
    } else {
        FallioError::Provider {
            provider: ProviderKind::Claude,
            message,
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApiMessage;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_request() -> MessageRequest {
        MessageRequest {
            model: "claude-3-opus-20240229".into(),
            max_tokens: 1024,
            messages: vec![ApiMessage {
                role: "user".into(),
                content: "Hello".into(),
            }],
        }
    }

    #[tokio::test]
    async fn complete_message_success() {
        let server = MockServer::start().await;
        let response_body = serde_json::json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": "The stars are kind today."}],
            "model": "claude-3-opus-20240229",
            "stop_reason": "end_turn"
        });

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-api-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let client = ClaudeClient::new().unwrap().with_base_url(server.uri());
        let result = client
            .complete_message("test-api-key", &test_request())
            .await
            .unwrap();
        assert_eq!(result.text(), "The stars are kind today.");
    }

    #[tokio::test]
    async fn status_429_maps_to_rate_limited() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "error": {"type": "rate_limit_error", "message": "Rate limited"}
        });

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(429).set_body_json(&error_body))
            .mount(&server)
            .await;

        let client = ClaudeClient::new().unwrap().with_base_url(server.uri());
        let err = client
            .complete_message("k", &test_request())
            .await
            .unwrap_err();
        assert!(err.is_rate_limited(), "got: {err}");
        assert!(err.to_string().contains("rate_limit_error"), "got: {err}");
    }

    #[tokio::test]
    async fn status_400_surfaces_api_error_detail() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "error": {"type": "invalid_request_error", "message": "Bad model"}
        });

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(400).set_body_json(&error_body))
            .mount(&server)
            .await;

        let client = ClaudeClient::new().unwrap().with_base_url(server.uri());
        let err = client
            .complete_message("k", &test_request())
            .await
            .unwrap_err();
        assert!(!err.is_rate_limited());
        assert!(err.to_string().contains("invalid_request_error"), "got: {err}");
    }

    #[tokio::test]
    async fn list_models_filters_to_claude_ids() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "data": [
                {"id": "claude-3-opus-20240229"},
                {"id": "claude-3-5-sonnet-20240620"},
                {"id": "unrelated-model"}
            ]
        });

        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = ClaudeClient::new().unwrap().with_base_url(server.uri());
        let models = client.list_models("k").await.unwrap();
        assert_eq!(models.len(), 2);
        assert!(models.iter().all(|m| m.starts_with("claude")));
    }
}
