// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fortune queue consumer.
//!
//! Each invocation drains a bounded batch of pending AI-assigned
//! fortunes, strictly sequentially, with a fixed delay between items to
//! stay under provider rate limits. A failed item stays `pending` for a
//! future run; a completed item gets a best-effort push notification
//! that never rolls back the completion.

use std::time::Duration;

use fallio_config::FallioConfig;
use fallio_core::types::ProviderSettings;
use fallio_core::{FallioError, GenerationRequest, ObjectStore};
use fallio_prompt::{ContextParts, GenerationContext, build_system_prompt, build_user_message};
use fallio_storage::queries::{fortunes, personas};
use fallio_storage::{Database, PendingFortune};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::attachments::fetch_image_parts;
use crate::orchestrator::{GenerationOutcome, Orchestrator, teller_model_override};
use crate::push::{PushClient, notify_fortune_completed};

/// Tunables for one queue run.
#[derive(Debug, Clone)]
pub struct QueueOptions {
    pub batch_size: u32,
    pub item_delay: Duration,
    pub max_tokens: u32,
    pub default_language: String,
    pub image_bucket: String,
}

impl QueueOptions {
    /// The production values from the loaded configuration.
    pub fn from_config(config: &FallioConfig) -> Self {
        Self {
            batch_size: config.generation.queue_batch_size,
            item_delay: Duration::from_millis(config.generation.queue_item_delay_ms),
            max_tokens: config.generation.max_tokens,
            default_language: config.generation.default_language.clone(),
            image_bucket: config.storage.image_bucket.clone(),
        }
    }
}

/// Per-item outcome, shaped for the cron endpoint's summary response.
#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    pub id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of one queue run.
#[derive(Debug, Clone, Serialize)]
pub struct QueueReport {
    pub processed: usize,
    pub results: Vec<ItemOutcome>,
}

/// Drain one batch of pending AI fortunes.
pub async fn process_queue(
    db: &Database,
    store: &dyn ObjectStore,
    push: &PushClient,
    orchestrator: &Orchestrator,
    settings: &ProviderSettings,
    options: &QueueOptions,
) -> Result<QueueReport, FallioError> {
    let pending = fortunes::pending_ai_fortunes(db, options.batch_size).await?;
    if pending.is_empty() {
        return Ok(QueueReport {
            processed: 0,
            results: Vec::new(),
        });
    }
    info!(count = pending.len(), "processing pending fortunes");

    let mut results = Vec::with_capacity(pending.len());
    for item in &pending {
        match process_item(db, store, push, orchestrator, settings, options, item).await {
            Ok(outcome) => {
                results.push(ItemOutcome {
                    id: item.fortune.id.clone(),
                    status: "success".into(),
                    provider: Some(outcome.provider.to_string()),
                    error: None,
                });
            }
            Err(e) => {
                // Left pending for a future run; no dead-letter marking.
                warn!(fortune_id = %item.fortune.id, error = %e, "fortune processing failed");
                results.push(ItemOutcome {
                    id: item.fortune.id.clone(),
                    status: "error".into(),
                    provider: None,
                    error: Some(e.to_string()),
                });
            }
        }
        tokio::time::sleep(options.item_delay).await;
    }

    Ok(QueueReport {
        processed: results.len(),
        results,
    })
}

/// Build context, assemble prompts, resolve attachments, run the chain,
/// persist the completion, and ping the requester's device.
async fn process_item(
    db: &Database,
    store: &dyn ObjectStore,
    push: &PushClient,
    orchestrator: &Orchestrator,
    settings: &ProviderSettings,
    options: &QueueOptions,
    item: &PendingFortune,
) -> Result<GenerationOutcome, FallioError> {
    let fortune = &item.fortune;

    let metadata: Value = fortune
        .metadata
        .as_deref()
        .and_then(|m| serde_json::from_str(m).ok())
        .unwrap_or(Value::Null);
    let language = metadata
        .get("language")
        .and_then(|v| v.as_str())
        .unwrap_or(&options.default_language)
        .to_string();

    let urls = fortunes::image_urls(db, &fortune.id).await?;
    let images = fetch_image_parts(store, &urls, &options.image_bucket).await;

    let context = GenerationContext::build(ContextParts {
        fortune_type: fortune.fortune_type.clone(),
        zodiac_sign: item.requester.zodiac_sign.clone(),
        gender: item.requester.gender.clone(),
        job: item.requester.job.clone(),
        relationship_status: item.requester.relationship_status.clone(),
        note: fortune.user_note.clone(),
        metadata: Some(metadata),
        language: Some(language),
        image_count: images.len(),
    });

    let persona = personas::get_persona(db, context.category.key()).await?;
    let system_prompt = build_system_prompt(&context, persona.as_ref().map(|p| p.body.as_str()));
    let user_message = build_user_message(&context);

    let preferred = Orchestrator::resolve_preferred(Some(&item.teller), settings);
    let request = GenerationRequest {
        system_prompt,
        user_message,
        images,
        model: teller_model_override(&item.teller),
        max_tokens: options.max_tokens,
    };

    let outcome = orchestrator.run(&request, preferred).await?;
    fortunes::complete_fortune(db, &fortune.id, &outcome.text).await?;
    info!(fortune_id = %fortune.id, provider = %outcome.provider, "fortune completed");

    if let Err(e) = notify_fortune_completed(db, push, &fortune.user_id, &fortune.id).await {
        warn!(fortune_id = %fortune.id, error = %e, "completion push failed");
    }

    Ok(outcome)
}
