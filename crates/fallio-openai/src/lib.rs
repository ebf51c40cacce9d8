// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI provider adapter for the Fallio fortune platform.
//!
//! Implements [`FortuneProvider`] over the chat completions API. The
//! system prompt rides in a proper system message; attached images are
//! embedded in the user message as base64 data URLs.

pub mod client;
pub mod types;

use async_trait::async_trait;
use fallio_core::types::ProviderCredentials;
use fallio_core::{FallioError, FortuneProvider, GenerationRequest, ProviderKind};
use tracing::debug;

use crate::client::OpenAiClient;
use crate::types::{ChatContent, ChatMessage, ChatRequest, ContentPart, ImageUrl};

/// Safe fallback model when neither the request nor the settings name one.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI provider implementing [`FortuneProvider`].
pub struct OpenAiProvider {
    client: OpenAiClient,
    credentials: ProviderCredentials,
}

impl OpenAiProvider {
    /// Creates a provider from admin-stored credentials. A missing API
    /// key is reported per call, not here.
    pub fn new(credentials: ProviderCredentials) -> Result<Self, FallioError> {
        Ok(Self {
            client: OpenAiClient::new()?,
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
                provider: ProviderKind::OpenAi,
            })
    }
}

#[async_trait]
impl FortuneProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, FallioError> {
        let api_key = self.api_key()?;
        let model = self.resolve_model(request.model.as_deref());
        debug!(model, images = request.images.len(), "openai generate");

        let mut user_parts = vec![ContentPart::Text {
            text: request.user_message.clone(),
        }];
        for image in &request.images {
            user_parts.push(ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: format!("data:{};base64,{}", image.media_type, image.data),
                },
            });
        }

        let api_request = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: ChatContent::Text(request.system_prompt.clone()),
                },
                ChatMessage {
                    role: "user".into(),
                    content: ChatContent::Parts(user_parts),
                },
            ],
        };

        let response = self.client.chat_completion(api_key, &api_request).await?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(FallioError::EmptyResponse {
                provider: ProviderKind::OpenAi,
            });
        }
        Ok(text)
    }

    async fn list_models(&self) -> Result<Vec<String>, FallioError> {
        let api_key = self.api_key()?;
        self.client.list_models(api_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fallio_core::ImagePart;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn creds(key: Option<&str>, model: Option<&str>) -> ProviderCredentials {
        ProviderCredentials {
            api_key: key.map(|s| s.to_string()),
            model: model.map(|s| s.to_string()),
        }
    }

    fn request(images: Vec<ImagePart>) -> GenerationRequest {
        GenerationRequest {
            system_prompt: "You are a palmist.".into(),
            user_message: "Read my palm.".into(),
            images,
            model: None,
            max_tokens: 1024,
        }
    }

    #[tokio::test]
    async fn missing_key_fails_without_any_http_call() {
        let provider = OpenAiProvider::new(creds(None, None)).unwrap();
        let err = provider.generate(&request(vec![])).await.unwrap_err();
        assert!(matches!(
            err,
            FallioError::MissingCredential {
                provider: ProviderKind::OpenAi
            }
        ));
    }

    #[test]
    fn model_resolution_prefers_request_then_settings_then_default() {
        let provider = OpenAiProvider::new(creds(Some("k"), Some("gpt-4o"))).unwrap();
        assert_eq!(provider.resolve_model(Some("o1-mini")), "o1-mini");
        assert_eq!(provider.resolve_model(None), "gpt-4o");

        let bare = OpenAiProvider::new(creds(Some("k"), None)).unwrap();
        assert_eq!(bare.resolve_model(None), DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn generate_sends_system_message_and_image_data_urls() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "choices": [{"message": {"content": "Your fate line is strong."}}]
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "messages": [
                    {"role": "system", "content": "You are a palmist."},
                    {"role": "user", "content": [
                        {"type": "text", "text": "Read my palm."},
                        {"type": "image_url",
                         "image_url": {"url": "data:image/jpeg;base64,ZmFrZQ=="}}
                    ]}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(creds(Some("k"), None))
            .unwrap()
            .with_base_url(server.uri());
        let text = provider
            .generate(&request(vec![ImagePart {
                media_type: "image/jpeg".into(),
                data: "ZmFrZQ==".into(),
            }]))
            .await
            .unwrap();
        assert_eq!(text, "Your fate line is strong.");
    }

    #[tokio::test]
    async fn null_content_is_an_empty_response_error() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "choices": [{"message": {"content": null}}]
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(creds(Some("k"), None))
            .unwrap()
            .with_base_url(server.uri());
        let err = provider.generate(&request(vec![])).await.unwrap_err();
        assert!(matches!(err, FallioError::EmptyResponse { .. }));
    }
}
