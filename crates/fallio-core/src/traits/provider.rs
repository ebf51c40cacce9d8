// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for text-generation integrations (Gemini, OpenAI, Claude).

use async_trait::async_trait;

use crate::error::FallioError;
use crate::types::{GenerationRequest, ProviderKind};

/// Uniform contract over the supported text-generation providers.
///
/// Adapters differ in capability (multimodal support varies), but all
/// honor the same contract: text in, non-empty text out, or an explicit
/// error. Adapters never panic on provider failures.
#[async_trait]
pub trait FortuneProvider: Send + Sync {
    /// Which provider this adapter speaks to.
    fn kind(&self) -> ProviderKind;

    /// Executes one generation call and returns the response text.
    ///
    /// Returns [`FallioError::MissingCredential`] when no API key is
    /// configured, [`FallioError::RateLimited`] on quota rejections, and
    /// [`FallioError::Provider`] for other call failures.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, FallioError>;

    /// Lists model identifiers available to the configured credential.
    ///
    /// Used by the model catalog and the horoscope generator's model
    /// probing. Adapters without a usable key return an error; callers
    /// fall back to hardcoded lists.
    async fn list_models(&self) -> Result<Vec<String>, FallioError> {
        Err(FallioError::MissingCredential {
            provider: self.kind(),
        })
    }
}
