// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider orchestration: preferred-provider resolution and the fixed
//! fallback chain.
//!
//! One orchestrator is constructed per invocation from the settings row;
//! there is no process-wide provider state. Individual provider failures
//! are recorded as reasons and never propagate; only total exhaustion is
//! a hard failure.

use fallio_core::types::{ProviderSettings, Teller};
use fallio_core::{
    FALLBACK_ORDER, FallioError, FortuneProvider, GenerationRequest, ProviderKind,
};
use tracing::{info, warn};

use fallio_claude::ClaudeProvider;
use fallio_gemini::GeminiProvider;
use fallio_openai::OpenAiProvider;

/// The result of a successful generation, with the chain's history.
#[derive(Debug)]
pub struct GenerationOutcome {
    /// The winning provider's response text.
    pub text: String,
    /// Which provider produced it.
    pub provider: ProviderKind,
    /// Reasons recorded for providers that failed before the winner.
    pub failures: Vec<String>,
}

/// Holds one adapter per supported provider and walks the fallback chain.
pub struct Orchestrator {
    providers: Vec<Box<dyn FortuneProvider>>,
}

impl Orchestrator {
    /// An orchestrator over explicit adapters (testing, custom wiring).
    pub fn new(providers: Vec<Box<dyn FortuneProvider>>) -> Self {
        Self { providers }
    }

    /// The production wiring: one adapter per provider, registered in
    /// fallback order, each fed its credentials from the settings row.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, FallioError> {
        let providers: Vec<Box<dyn FortuneProvider>> = vec![
            Box::new(GeminiProvider::new(
                settings.credentials(ProviderKind::Gemini).clone(),
            )?),
            Box::new(OpenAiProvider::new(
                settings.credentials(ProviderKind::OpenAi).clone(),
            )?),
            Box::new(ClaudeProvider::new(
                settings.credentials(ProviderKind::Claude).clone(),
            )?),
        ];
        Ok(Self { providers })
    }

    /// Resolve the provider to try first: a teller override (unless it is
    /// empty or "default") beats the global active provider.
    pub fn resolve_preferred(
        teller: Option<&Teller>,
        settings: &ProviderSettings,
    ) -> ProviderKind {
        teller
            .and_then(|t| t.provider_override())
            .unwrap_or_else(|| settings.active_kind())
    }

    /// The registered adapter for a provider, if any.
    pub fn provider(&self, kind: ProviderKind) -> Option<&dyn FortuneProvider> {
        self.providers
            .iter()
            .find(|p| p.kind() == kind)
            .map(|p| p.as_ref())
    }

    /// Execute the preferred provider, then cascade through the remaining
    /// providers in fixed order until one returns text.
    ///
    /// The request's model override applies to the preferred provider
    /// only; fallback providers run with their own configured defaults.
    pub async fn run(
        &self,
        request: &GenerationRequest,
        preferred: ProviderKind,
    ) -> Result<GenerationOutcome, FallioError> {
        let mut failures: Vec<String> = Vec::new();

        match self.try_provider(preferred, request).await {
            Ok(text) => {
                return Ok(GenerationOutcome {
                    text,
                    provider: preferred,
                    failures,
                });
            }
            Err(reason) => failures.push(reason),
        }

        let mut fallback_request = request.clone();
        fallback_request.model = None;

        for kind in FALLBACK_ORDER {
            if kind == preferred {
                continue;
            }
            match self.try_provider(kind, &fallback_request).await {
                Ok(text) => {
                    info!(provider = %kind, "fallback provider succeeded");
                    return Ok(GenerationOutcome {
                        text,
                        provider: kind,
                        failures,
                    });
                }
                Err(reason) => failures.push(reason),
            }
        }

        Err(FallioError::AllProvidersFailed { reasons: failures })
    }

    /// One provider attempt, reduced to text or a reason string.
    async fn try_provider(
        &self,
        kind: ProviderKind,
        request: &GenerationRequest,
    ) -> Result<String, String> {
        let Some(provider) = self.provider(kind) else {
            return Err(format!("{kind} adapter is not registered"));
        };
        match provider.generate(request).await {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!(provider = %kind, error = %e, "provider attempt failed");
                Err(e.to_string())
            }
        }
    }
}

/// The teller's model override, applicable only when the teller also
/// overrides the provider (a model name is meaningless against whichever
/// provider the global default happens to be).
pub fn teller_model_override(teller: &Teller) -> Option<String> {
    teller.provider_override()?;
    teller.model.clone().filter(|m| !m.trim().is_empty())
}
