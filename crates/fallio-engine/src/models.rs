// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider model catalog.
//!
//! Probes each provider's model-list endpoint concurrently and falls
//! back to known-good hardcoded lists when a key is missing, a call
//! fails, or filtering leaves nothing usable.

use fallio_core::ProviderKind;
use serde::Serialize;
use tracing::debug;

use crate::orchestrator::Orchestrator;

/// The catalog served to the admin model picker.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderModels {
    pub claude: Vec<String>,
    pub gemini: Vec<String>,
    pub openai: Vec<String>,
}

/// Known-good models per provider, used whenever probing yields nothing.
pub fn fallback_models(kind: ProviderKind) -> Vec<String> {
    let ids: &[&str] = match kind {
        ProviderKind::Claude => &[
            "claude-3-5-sonnet-20240620",
            "claude-3-opus-20240229",
            "claude-3-sonnet-20240229",
        ],
        ProviderKind::Gemini => &["gemini-1.5-pro", "gemini-1.5-flash", "gemini-1.0-pro"],
        ProviderKind::OpenAi => &["gpt-4o", "gpt-4o-mini", "gpt-4-turbo"],
    };
    ids.iter().map(|s| s.to_string()).collect()
}

/// Probe all three providers side by side and assemble the catalog.
pub async fn model_catalog(orchestrator: &Orchestrator) -> ProviderModels {
    let (claude, gemini, openai) = tokio::join!(
        probe(orchestrator, ProviderKind::Claude),
        probe(orchestrator, ProviderKind::Gemini),
        probe(orchestrator, ProviderKind::OpenAi),
    );
    ProviderModels {
        claude,
        gemini,
        openai,
    }
}

async fn probe(orchestrator: &Orchestrator, kind: ProviderKind) -> Vec<String> {
    let listed = match orchestrator.provider(kind) {
        Some(provider) => provider.list_models().await.unwrap_or_else(|e| {
            debug!(provider = %kind, error = %e, "model probe failed");
            Vec::new()
        }),
        None => Vec::new(),
    };
    if listed.is_empty() {
        fallback_models(kind)
    } else {
        listed
    }
}
