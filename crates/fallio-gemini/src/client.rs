// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini generateContent API.

use std::time::Duration;

use fallio_core::{FallioError, ProviderKind};
use reqwest::StatusCode;
use tracing::debug;

use crate::types::{
    ApiErrorResponse, GenerateContentRequest, GenerateContentResponse, ModelListResponse,
};

/// Base URL for the Generative Language API.
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// HTTP client for Gemini API communication. The API key travels as a
/// query parameter, per the REST surface.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    /// Creates a new client.
    pub fn new() -> Result<Self, FallioError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| FallioError::Provider {
                provider: ProviderKind::Gemini,
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

    /// Executes one generateContent call against the named model.
    pub async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, FallioError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, model
        );
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(request)
            .send()
            .await
            .map_err(|e| FallioError::Provider {
                provider: ProviderKind::Gemini,
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model, "gemini response received");

        if status.is_success() {
            return response.json().await.map_err(|e| FallioError::Provider {
                provider: ProviderKind::Gemini,
                message: format!("failed to parse API response: {e}"),
                source: Some(Box::new(e)),
            });
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status, &body))
    }

    /// Lists chat-capable model ids usable with the key, ordered by the
    /// same usefulness heuristics the admin model picker applies:
    /// newer families and flash variants first.
    pub async fn list_models(&self, api_key: &str) -> Result<Vec<String>, FallioError> {
        let url = format!("{}/v1beta/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("key", api_key)])
            .send()
            .await
            .map_err(|e| FallioError::Provider {
                provider: ProviderKind::Gemini,
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
                provider: ProviderKind::Gemini,
                message: format!("failed to parse model list: {e}"),
                source: Some(Box::new(e)),
            })?;

        // API names arrive as "models/<id>"; keep only the id.
        let mut ids: Vec<String> = list
            .models
            .into_iter()
            .map(|m| {
                m.name
                    .rsplit('/')
                    .next()
                    .unwrap_or(m.name.as_str())
                    .to_string()
            })
            .filter(|id| {
                id.starts_with("gemini") && !id.contains("embedding") && !id.contains("bison")
            })
            .collect();
        ids.sort_by_key(|id| std::cmp::Reverse(model_score(id)));
        Ok(ids)
    }
}

/// Usefulness heuristic: prefer newer families, then flash variants.
pub fn model_score(id: &str) -> u32 {
    let mut score = 0;
    if id.contains("2.0") {
        score += 3;
    }
    if id.contains("1.5") {
        score += 2;
    }
    if id.contains("flash") {
        score += 1;
    }
    score
}

fn classify_error(status: StatusCode, body: &str) -> FallioError {
    let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(body) {
        format!(
            "Gemini API error ({}): {}",
            api_err.error.status, api_err.error.message
        )
    } else {
        format!("API returned {status}: {body}")
    };

    if status == StatusCode::TOO_MANY_REQUESTS {
        FallioError::RateLimited {
            provider: ProviderKind::Gemini,
            message,
        }
    } else {
        FallioError::Provider {
            provider: ProviderKind::Gemini,
            message,
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Content, GenerationConfig, Part, permissive_safety_settings};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_request() -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::Text {
                    text: "Hello".into(),
                }],
            }],
            safety_settings: permissive_safety_settings(),
            generation_config: GenerationConfig {
                max_output_tokens: 1024,
            },
        }
    }

    #[tokio::test]
    async fn generate_content_success_with_key_in_query() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "A bird in the cup."}]}}]
        });

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(query_param("key", "g-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = GeminiClient::new().unwrap().with_base_url(server.uri());
        let resp = client
            .generate_content("g-key", "gemini-1.5-flash", &test_request())
            .await
            .unwrap();
        assert_eq!(resp.text(), "A bird in the cup.");
    }

    #[tokio::test]
    async fn status_429_maps_to_rate_limited() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "error": {"code": 429, "message": "quota exceeded", "status": "RESOURCE_EXHAUSTED"}
        });

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(429).set_body_json(&body))
            .mount(&server)
            .await;

        let client = GeminiClient::new().unwrap().with_base_url(server.uri());
        let err = client
            .generate_content("k", "gemini-1.5-flash", &test_request())
            .await
            .unwrap_err();
        assert!(err.is_rate_limited(), "got: {err}");
        assert!(err.to_string().contains("RESOURCE_EXHAUSTED"), "got: {err}");
    }

    #[tokio::test]
    async fn server_error_is_a_plain_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = GeminiClient::new().unwrap().with_base_url(server.uri());
        let err = client
            .generate_content("k", "gemini-1.5-flash", &test_request())
            .await
            .unwrap_err();
        assert!(!err.is_rate_limited());
        assert!(err.to_string().contains("500"), "got: {err}");
    }

    #[tokio::test]
    async fn list_models_strips_prefix_filters_and_ranks() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "models": [
                {"name": "models/gemini-1.0-pro"},
                {"name": "models/embedding-001"},
                {"name": "models/gemini-1.5-flash"},
                {"name": "models/text-bison-001"},
                {"name": "models/gemini-2.0-flash-exp"}
            ]
        });

        Mock::given(method("GET"))
            .and(path("/v1beta/models"))
            .and(query_param("key", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = GeminiClient::new().unwrap().with_base_url(server.uri());
        let models = client.list_models("k").await.unwrap();
        assert_eq!(
            models,
            vec![
                "gemini-2.0-flash-exp".to_string(),
                "gemini-1.5-flash".to_string(),
                "gemini-1.0-pro".to_string(),
            ]
        );
    }

    #[test]
    fn model_score_prefers_newer_and_flash() {
        assert!(model_score("gemini-2.0-flash-exp") > model_score("gemini-1.5-flash"));
        assert!(model_score("gemini-1.5-flash") > model_score("gemini-1.5-pro"));
        assert_eq!(model_score("gemini-1.0-pro"), 0);
    }
}
