// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The canonical normalized view of one generation request.
//!
//! Normalization happens exactly once, here: every consumer downstream
//! sees display-ready, never-null values instead of sprinkling its own
//! "Unknown" fallbacks.

use serde_json::Value;

use crate::category::FortuneCategory;

/// Placeholder for an absent zodiac sign.
pub const UNKNOWN: &str = "Unknown";
/// Placeholder for absent gender/job/relationship attributes.
pub const NOT_SPECIFIED: &str = "Not specified";
/// Placeholder for an absent user question.
pub const NO_QUESTION: &str = "No specific question.";

/// Raw request fields as they arrive from storage or the HTTP surface.
/// Everything except the fortune type is optional.
#[derive(Debug, Clone, Default)]
pub struct ContextParts {
    pub fortune_type: String,
    pub zodiac_sign: Option<String>,
    pub gender: Option<String>,
    pub job: Option<String>,
    pub relationship_status: Option<String>,
    pub note: Option<String>,
    pub metadata: Option<Value>,
    pub language: Option<String>,
    pub image_count: usize,
}

/// The normalized context consumed by the prompt assembler.
///
/// Constructed fresh per generation attempt; never shared or mutated
/// across requests. Construction cannot fail.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub fortune_type: String,
    pub category: FortuneCategory,
    pub zodiac_sign: String,
    pub gender: String,
    pub job: String,
    pub relationship_status: String,
    pub note: String,
    pub metadata: Value,
    pub language: Option<String>,
    pub image_count: usize,
}

impl GenerationContext {
    /// Normalize raw request fields into a display-ready context.
    pub fn build(parts: ContextParts) -> GenerationContext {
        let category = FortuneCategory::normalize(&parts.fortune_type);
        GenerationContext {
            category,
            fortune_type: parts.fortune_type,
            zodiac_sign: non_empty_or(parts.zodiac_sign, UNKNOWN),
            gender: non_empty_or(parts.gender, NOT_SPECIFIED),
            job: non_empty_or(parts.job, NOT_SPECIFIED),
            relationship_status: non_empty_or(parts.relationship_status, NOT_SPECIFIED),
            note: non_empty_or(parts.note, NO_QUESTION),
            metadata: parts.metadata.unwrap_or(Value::Null),
            language: parts
                .language
                .filter(|l| !l.trim().is_empty())
                .map(|l| l.trim().to_lowercase()),
            image_count: parts.image_count,
        }
    }

    /// The language code prompts are built for. Turkish is the product's
    /// home market and the fallback.
    pub fn language_or_default(&self) -> &str {
        self.language.as_deref().unwrap_or("tr")
    }
}

fn non_empty_or(value: Option<String>, placeholder: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => placeholder.to_string(),
    }
}
