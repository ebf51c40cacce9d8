// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini provider adapter for the Fallio fortune platform.
//!
//! Implements [`FortuneProvider`] over the generateContent REST API.
//! Gemini is the multimodal workhorse: attached cup/palm images travel
//! as inline base64 parts after the combined prompt text.

pub mod client;
pub mod types;

use async_trait::async_trait;
use fallio_core::types::ProviderCredentials;
use fallio_core::{FallioError, FortuneProvider, GenerationRequest, ProviderKind};
use tracing::debug;

use crate::client::GeminiClient;
use crate::types::{
    Content, GenerateContentRequest, GenerationConfig, InlineData, Part,
    permissive_safety_settings,
};

/// Safe fallback model when neither the request nor the settings name one.
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Gemini provider implementing [`FortuneProvider`].
pub struct GeminiProvider {
    client: GeminiClient,
    credentials: ProviderCredentials,
}

impl GeminiProvider {
    /// Creates a provider from admin-stored credentials. A missing API
    /// key is reported per call, not here.
    pub fn new(credentials: ProviderCredentials) -> Result<Self, FallioError> {
        Ok(Self {
            client: GeminiClient::new()?,
            credentials,
        })
    }

    /// Overrides the API base URL (testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }

    /// Model selection: request override -> configured default -> hardcoded
    /// fallback. Settings sometimes carry the raw API name ("models/...");
    /// the SDK-style bare id is what the endpoint path wants.
    fn resolve_model(&self, request_model: Option<&str>) -> String {
        request_model
            .filter(|m| !m.is_empty())
            .or(self.credentials.model.as_deref())
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
            .trim_start_matches("models/")
            .to_string()
    }

    fn api_key(&self) -> Result<&str, FallioError> {
        self.credentials
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(FallioError::MissingCredential {
                provider: ProviderKind::Gemini,
            })
    }
}

#[async_trait]
impl FortuneProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, FallioError> {
        let api_key = self.api_key()?;
        let model = self.resolve_model(request.model.as_deref());
        debug!(model, images = request.images.len(), "gemini generate");

        let mut parts = vec![Part::Text {
            text: format!("{}\n\n{}", request.system_prompt, request.user_message),
        }];
        for image in &request.images {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.media_type.clone(),
                    data: image.data.clone(),
                },
            });
        }

        let api_request = GenerateContentRequest {
            contents: vec![Content { parts }],
            safety_settings: permissive_safety_settings(),
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
            },
        };

        let response = self
            .client
            .generate_content(api_key, &model, &api_request)
            .await?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(FallioError::EmptyResponse {
                provider: ProviderKind::Gemini,
            });
        }
        Ok(text)
    }

    async fn list_models(&self) -> Result<Vec<String>, FallioError> {
        let api_key = self.api_key()?;
        self.client.list_models(api_key).await
    }
}
