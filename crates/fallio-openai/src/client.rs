// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI chat completions API.

use std::time::Duration;

use fallio_core::{FallioError, ProviderKind};
use reqwest::StatusCode;
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse, ModelListResponse};

/// Base URL for the OpenAI API.
const API_BASE_URL: &str = "https://api.openai.com";

/// Cap on how many model ids the catalog surfaces.
const MODEL_LIST_LIMIT: usize = 15;

/// HTTP client for OpenAI API communication.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiClient {
    /// Creates a new client.
    pub fn new() -> Result<Self, FallioError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| FallioError::Provider {
                provider: ProviderKind::OpenAi,
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

    /// Executes one chat completion call.
    pub async fn chat_completion(
        &self,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<ChatResponse, FallioError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| FallioError::Provider {
                provider: ProviderKind::OpenAi,
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, "openai response received");

        if status.is_success() {
            return response.json().await.map_err(|e| FallioError::Provider {
                provider: ProviderKind::OpenAi,
                message: format!("failed to parse API response: {e}"),
                source: Some(Box::new(e)),
            });
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status, &body))
    }

    /// Lists chat-capable model ids: GPT and o1 families, skipping the
    /// audio/realtime variants that cannot serve text generation.
    pub async fn list_models(&self, api_key: &str) -> Result<Vec<String>, FallioError> {
        let url = format!("{}/v1/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| FallioError::Provider {
                provider: ProviderKind::OpenAi,
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
                provider: ProviderKind::OpenAi,
                message: format!("failed to parse model list: {e}"),
                source: Some(Box::new(e)),
            })?;

        let mut ids: Vec<String> = list
            .data
            .into_iter()
            .map(|m| m.id)
            .filter(|id| {
                (id.starts_with("gpt-4") || id.starts_with("gpt-3.5") || id.starts_with("o1-"))
                    && !id.contains("audio")
                    && !id.contains("realtime")
            })
            .collect();
        // Reverse-alphabetical keeps newer releases near the top.
        ids.sort_unstable();
        ids.reverse();
        ids.truncate(MODEL_LIST_LIMIT);
        Ok(ids)
    }
}

fn classify_error(status: StatusCode, body: &str) -> FallioError {
    let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(body) {
        format!(
            "OpenAI API error ({}): {}",
            api_err.error.type_, api_err.error.message
        )
    } else {
        format!("API returned {status}: {body}")
    };

    if status == StatusCode::TOO_MANY_REQUESTS {
        FallioError::RateLimited {
            provider: ProviderKind::OpenAi,
            message,
        }
    } else {
        FallioError::Provider {
            provider: ProviderKind::OpenAi,
            message,
            source: None,
        }
    }
}
