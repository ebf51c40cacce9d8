// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude provider adapter for the Fallio fortune platform.
//!
//! Implements [`FortuneProvider`] over the Anthropic Messages API. The
//! assembled system prompt and user message are sent as one user message;
//! attached images are not forwarded (Claude is the text-only member of
//! the provider set).

pub mod client;
pub mod types;

use async_trait::async_trait;
use fallio_core::types::ProviderCredentials;
use fallio_core::{FallioError, FortuneProvider, GenerationRequest, ProviderKind};
use tracing::debug;

use crate::client::ClaudeClient;
use crate::types::{ApiMessage, MessageRequest};

/// Safe fallback model when neither the request nor the settings name one.
const DEFAULT_MODEL: &str = "claude-3-opus-20240229";

/// Claude provider implementing [`FortuneProvider`].
pub struct ClaudeProvider {
    client: ClaudeClient,
    credentials: ProviderCredentials,
}

impl ClaudeProvider {
    /// Creates a provider from admin-stored credentials. A missing API
    /// key is allowed here and reported per call, so the orchestrator
    /// can record it as one more fallback reason.
    pub fn new(credentials: ProviderCredentials) -> Result<Self, FallioError> {
        Ok(Self {
            client: ClaudeClient::new()?,
            credentials,
        })
    }

    /// Overrides the API base URL (testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }

    /// Model selection: request override -> configured default -> hardcoded fallback.
    fn resolve_model(&self, request_model: Option<&str>) -> String {
        request_model
            .filter(|m| !m.is_empty())
            .or(self.credentials.model.as_deref())
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
            .to_string()
    }

    fn api_key(&self) -> Result<&str, FallioError> {
        self.credentials
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(FallioError::MissingCredential {
                provider: ProviderKind::Claude,
            })
    }
}

#[async_trait]
impl FortuneProvider for ClaudeProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Claude
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, FallioError> {
        let api_key = self.api_key()?;
        let model = self.resolve_model(request.model.as_deref());
        debug!(model, images = request.images.len(), "claude generate");

        let api_request = MessageRequest {
            model,
            max_tokens: request.max_tokens,
            messages: vec![ApiMessage {
                role: "user".into(),
                content: format!("{}\n\n{}", request.system_prompt, request.user_message),
            }],
        };

        let response = self.client.complete_message(api_key, &api_request).await?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(FallioError::EmptyResponse {
                provider: ProviderKind::Claude,
            });
        }
        Ok(text)
    }

    async fn list_models(&self) -> Result<Vec<String>, FallioError> {
        let api_key = self.api_key()?;
        self.client.list_models(api_key).await
    }
}
