// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Fallio fortune platform.

use thiserror::Error;

use crate::types::ProviderKind;

/// The primary error type used across all Fallio crates.
#[derive(Debug, Error)]
pub enum FallioError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Outbound HTTP errors unrelated to a text-generation provider
    /// (object storage reads, push dispatch).
    #[error("http error: {message}")]
    Http {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A provider has no API key configured. Treated as one more fallback
    /// reason by the orchestrator, never a hard failure on its own.
    #[error("{provider} API key is not configured")]
    MissingCredential { provider: ProviderKind },

    /// A provider call failed (network, HTTP error status, bad payload).
    #[error("{provider} error: {message}")]
    Provider {
        provider: ProviderKind,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A provider rejected the call for quota/throughput reasons (HTTP 429).
    /// The horoscope generator retries on this variant and only this variant.
    #[error("{provider} rate limited: {message}")]
    RateLimited {
        provider: ProviderKind,
        message: String,
    },

    /// A provider returned a success status but no usable text.
    #[error("{provider} returned an empty response")]
    EmptyResponse { provider: ProviderKind },

    /// A structured-generation response could not be parsed into the
    /// required shape. Aborts the unit of work without retry.
    #[error("malformed response: {message}")]
    MalformedResponse { message: String },

    /// Every provider in the fallback chain failed. The only generation
    /// failure surfaced to callers; carries each provider's reason.
    #[error("all providers failed: {}", reasons.join("; "))]
    AllProvidersFailed { reasons: Vec<String> },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FallioError {
    /// True when retrying after a delay could plausibly succeed.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FallioError::RateLimited { .. })
    }
}
