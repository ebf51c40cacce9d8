// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Fallio workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The supported text-generation providers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    Claude,
}

/// Fixed fallback order. The orchestrator walks this list after the
/// preferred provider fails, skipping the one already tried.
pub const FALLBACK_ORDER: [ProviderKind; 3] = [
    ProviderKind::Gemini,
    ProviderKind::OpenAi,
    ProviderKind::Claude,
];

impl ProviderKind {
    /// Parses a teller or settings provider string.
    ///
    /// Empty strings and the literal "default" mean "no override". The
    /// legacy value "chatgpt" maps to OpenAI. Unrecognized values are
    /// treated as no override rather than an error.
    pub fn parse_override(value: &str) -> Option<ProviderKind> {
        let v = value.trim().to_lowercase();
        match v.as_str() {
            "" | "default" => None,
            "chatgpt" | "openai" => Some(ProviderKind::OpenAi),
            "gemini" => Some(ProviderKind::Gemini),
            "claude" => Some(ProviderKind::Claude),
            _ => None,
        }
    }
}

/// Horoscope period granularity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HoroscopeScope {
    Daily,
    Weekly,
    Monthly,
}

/// Canonical zodiac sign slugs. Horoscope entries whose sign is not in
/// this set are discarded.
pub const ZODIAC_SIGNS: [&str; 12] = [
    "koc", "boga", "ikizler", "yengec", "aslan", "basak",
    "terazi", "akrep", "yay", "oglak", "kova", "balik",
];

/// A base64-encoded image attached to a generation request.
///
/// Provider adapters translate this neutral form into their own wire
/// format (inline data, data URLs, content blocks).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePart {
    /// MIME type, e.g. "image/jpeg".
    pub media_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

/// A provider-neutral generation request.
///
/// Built once per generation attempt and handed unchanged to whichever
/// adapter ends up executing it.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Assembled system prompt (persona + language directive + rules).
    pub system_prompt: String,
    /// Assembled user message (rendered context fields).
    pub user_message: String,
    /// Attached images, already base64-encoded.
    pub images: Vec<ImagePart>,
    /// Model override for the preferred provider. `None` lets the adapter
    /// pick its configured default.
    pub model: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

// --- Persisted domain rows ---

/// A fortune request as stored in the `fortunes` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fortune {
    pub id: String,
    pub user_id: String,
    pub teller_id: Option<String>,
    pub fortune_type: String,
    pub user_note: Option<String>,
    /// Arbitrary JSON metadata (selected cards, chosen color, language...).
    pub metadata: Option<String>,
    pub status: String,
    pub response: Option<String>,
    /// Cleared on completion so the mobile client can badge the result.
    pub is_read: bool,
    pub created_at: String,
    pub completed_at: Option<String>,
}

/// Requester attributes joined from the `users` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequesterProfile {
    pub zodiac_sign: Option<String>,
    pub gender: Option<String>,
    pub job: Option<String>,
    pub relationship_status: Option<String>,
}

/// A fortune teller as stored in the `tellers` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teller {
    pub id: String,
    pub name: String,
    pub is_ai: bool,
    /// Provider preference override ("gemini", "openai", "claude",
    /// legacy "chatgpt", or "default" for none).
    pub provider: Option<String>,
    /// Model-name override applied when the override provider runs.
    pub model: Option<String>,
}

impl Teller {
    /// The teller's effective provider override, if any.
    pub fn provider_override(&self) -> Option<ProviderKind> {
        self.provider
            .as_deref()
            .and_then(ProviderKind::parse_override)
    }
}

/// A persona row: a reusable system-prompt body bound to a normalized
/// fortune-type category key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub key: String,
    pub body: String,
    pub description: Option<String>,
}

/// Per-provider credential and default model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderCredentials {
    pub api_key: Option<String>,
    pub model: Option<String>,
}

/// The single provider-settings row, loaded once per invocation and
/// passed by value into the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Process-wide default provider selector.
    pub active_provider: Option<String>,
    pub gemini: ProviderCredentials,
    pub openai: ProviderCredentials,
    pub claude: ProviderCredentials,
}

impl ProviderSettings {
    /// Credentials for the given provider.
    pub fn credentials(&self, kind: ProviderKind) -> &ProviderCredentials {
        match kind {
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Claude => &self.claude,
        }
    }

    /// The configured global default provider. Unset or unrecognized
    /// values fall back to Gemini.
    pub fn active_kind(&self) -> ProviderKind {
        self.active_provider
            .as_deref()
            .and_then(ProviderKind::parse_override)
            .unwrap_or(ProviderKind::Gemini)
    }
}

/// One horoscope entry, unique on (sign, scope, effective_date, language).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoroscopeEntry {
    pub sign: String,
    pub scope: HoroscopeScope,
    pub effective_date: String,
    pub language: String,
    pub general: String,
    pub love: String,
    /// The generated "career" text is persisted under this column name.
    /// Intentional remapping inherited from the stored schema.
    pub money: String,
    pub health: String,
}

/// A registered push device for a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDevice {
    pub user_id: String,
    pub push_token: String,
    pub is_active: bool,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn provider_kind_display_round_trips() {
        for kind in FALLBACK_ORDER {
            let s = kind.to_string();
            assert_eq!(ProviderKind::from_str(&s).unwrap(), kind);
        }
        assert_eq!(ProviderKind::OpenAi.to_string(), "openai");
    }

    #[test]
    fn parse_override_handles_legacy_and_default() {
        assert_eq!(
            ProviderKind::parse_override("chatgpt"),
            Some(ProviderKind::OpenAi)
        );
        assert_eq!(
            ProviderKind::parse_override("Claude"),
            Some(ProviderKind::Claude)
        );
        assert_eq!(ProviderKind::parse_override("default"), None);
        assert_eq!(ProviderKind::parse_override(""), None);
        assert_eq!(ProviderKind::parse_override("palantir"), None);
    }

    #[test]
    fn teller_override_ignores_default() {
        let teller = Teller {
            id: "t1".into(),
            name: "Falci Nene".into(),
            is_ai: true,
            provider: Some("default".into()),
            model: None,
        };
        assert_eq!(teller.provider_override(), None);
    }

    #[test]
    fn settings_active_kind_falls_back_to_gemini() {
        let settings = ProviderSettings::default();
        assert_eq!(settings.active_kind(), ProviderKind::Gemini);

        let settings = ProviderSettings {
            active_provider: Some("claude".into()),
            ..Default::default()
        };
        assert_eq!(settings.active_kind(), ProviderKind::Claude);
    }

    #[test]
    fn zodiac_sign_set_is_twelve_unique_slugs() {
        let mut sorted = ZODIAC_SIGNS.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 12);
    }

    #[test]
    fn horoscope_scope_serializes_lowercase() {
        assert_eq!(HoroscopeScope::Daily.to_string(), "daily");
        assert_eq!(
            HoroscopeScope::from_str("monthly").unwrap(),
            HoroscopeScope::Monthly
        );
    }
}
