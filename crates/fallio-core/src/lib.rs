// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Fallio fortune platform.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Fallio workspace. Provider adapters and
//! the generation engine build on what is defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::FallioError;
pub use traits::{FortuneProvider, ObjectStore};
pub use types::{
    FALLBACK_ORDER, GenerationRequest, HoroscopeScope, ImagePart, ProviderKind,
    ProviderSettings, ZODIAC_SIGNS,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_cover_the_failure_taxonomy() {
        let _config = FallioError::Config("test".into());
        let _storage = FallioError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _http = FallioError::Http {
            message: "test".into(),
            source: None,
        };
        let _missing = FallioError::MissingCredential {
            provider: ProviderKind::Gemini,
        };
        let _provider = FallioError::Provider {
            provider: ProviderKind::OpenAi,
            message: "test".into(),
            source: None,
        };
        let _rate = FallioError::RateLimited {
            provider: ProviderKind::Gemini,
            message: "test".into(),
        };
        let _empty = FallioError::EmptyResponse {
            provider: ProviderKind::Claude,
        };
        let _malformed = FallioError::MalformedResponse {
            message: "test".into(),
        };
        let _exhausted = FallioError::AllProvidersFailed { reasons: vec![] };
        let _internal = FallioError::Internal("test".into());
    }

    #[test]
    fn fallback_order_is_stable() {
        assert_eq!(
            FALLBACK_ORDER,
            [
                ProviderKind::Gemini,
                ProviderKind::OpenAi,
                ProviderKind::Claude
            ]
        );
    }
}
