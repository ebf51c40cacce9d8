// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted provider adapter for deterministic testing.
//!
//! `ScriptedProvider` implements `FortuneProvider` with pre-configured
//! outcomes, enabling fast, CI-runnable tests of the orchestrator's
//! fallback chain and the horoscope retry machine without external API
//! calls. Call counts are recorded so tests can assert exactly which
//! adapters ran.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use fallio_core::{FallioError, FortuneProvider, GenerationRequest, ProviderKind};

/// A provider whose outcomes are popped from a FIFO script.
///
/// When the script runs dry, a default "scripted response" succeeds, so
/// tests only script the interesting prefix.
pub struct ScriptedProvider {
    kind: ProviderKind,
    script: Arc<Mutex<VecDeque<Result<String, FallioError>>>>,
    calls: Arc<AtomicUsize>,
    models: Vec<String>,
}

impl ScriptedProvider {
    /// A provider that always succeeds with the default response.
    pub fn new(kind: ProviderKind) -> Self {
        Self::with_script(kind, Vec::new())
    }

    /// A provider pre-loaded with the given outcomes, in order.
    pub fn with_script(
        kind: ProviderKind,
        script: Vec<Result<String, FallioError>>,
    ) -> Self {
        Self {
            kind,
            script: Arc::new(Mutex::new(VecDeque::from(script))),
            calls: Arc::new(AtomicUsize::new(0)),
            models: Vec::new(),
        }
    }

    /// Sets what `list_models` reports.
    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    /// Appends an outcome to the script.
    pub async fn push(&self, outcome: Result<String, FallioError>) {
        self.script.lock().await.push_back(outcome);
    }

    /// How many `generate` calls this provider has served.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Shared handle to the call counter, for asserting after the
    /// provider has been moved into an orchestrator.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl FortuneProvider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<String, FallioError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok("scripted response".to_string()))
    }

    async fn list_models(&self) -> Result<Vec<String>, FallioError> {
        if self.models.is_empty() {
            Err(FallioError::MissingCredential {
                provider: self.kind,
            })
        } else {
            Ok(self.models.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            system_prompt: "s".into(),
            user_message: "u".into(),
            images: vec![],
            model: None,
            max_tokens: 64,
        }
    }

    #[tokio::test]
    async fn scripted_outcomes_pop_in_order_then_default() {
        let provider = ScriptedProvider::with_script(
            ProviderKind::Gemini,
            vec![
                Ok("first".into()),
                Err(FallioError::EmptyResponse {
                    provider: ProviderKind::Gemini,
                }),
            ],
        );

        assert_eq!(provider.generate(&request()).await.unwrap(), "first");
        assert!(provider.generate(&request()).await.is_err());
        assert_eq!(
            provider.generate(&request()).await.unwrap(),
            "scripted response"
        );
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn counter_handle_survives_moving_the_provider() {
        let provider = ScriptedProvider::new(ProviderKind::Claude);
        let counter = provider.call_counter();
        let boxed: Box<dyn FortuneProvider> = Box::new(provider);
        boxed.generate(&request()).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn list_models_reflects_configuration() {
        let provider = ScriptedProvider::new(ProviderKind::Gemini)
            .with_models(vec!["gemini-1.5-flash".into()]);
        assert_eq!(
            provider.list_models().await.unwrap(),
            vec!["gemini-1.5-flash".to_string()]
        );

        let keyless = ScriptedProvider::new(ProviderKind::Gemini);
        assert!(keyless.list_models().await.is_err());
    }
}
