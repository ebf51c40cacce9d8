// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Horoscope batch generator.
//!
//! One provider call per scope/language covers the entire sign set: the
//! prompt demands a strict JSON array of twelve objects keyed by sign.
//! Rate-limited failures retry with escalating backoff; anything else
//! aborts that scope/language immediately. Upserts land on the
//! (sign, scope, effective_date, language) composite key, so re-runs
//! overwrite instead of duplicating.

use std::fmt::Write as _;
use std::time::Duration;

use chrono::{Datelike, Duration as ChronoDuration, NaiveDate, Weekday};
use fallio_config::model::HoroscopeConfig;
use fallio_core::types::HoroscopeEntry;
use fallio_core::{
    FallioError, FortuneProvider, GenerationRequest, HoroscopeScope, ZODIAC_SIGNS,
};
use fallio_storage::Database;
use fallio_storage::queries::horoscopes;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Tunables for one batch run.
#[derive(Debug, Clone)]
pub struct HoroscopeOptions {
    pub languages: Vec<String>,
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub success_delay: Duration,
    pub probe_models: bool,
    pub max_tokens: u32,
}

impl HoroscopeOptions {
    /// The production values from the loaded configuration.
    pub fn from_config(config: &HoroscopeConfig, max_tokens: u32) -> Self {
        Self {
            languages: config.languages.clone(),
            max_attempts: config.retry_max_attempts,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            success_delay: Duration::from_millis(config.success_delay_ms),
            probe_models: config.probe_models,
            max_tokens,
        }
    }
}

/// Retry state for one scope/language unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Pending,
    Retrying(u32),
    Succeeded,
    Failed,
}

/// Backoff before retry `attempt` (1-based): a pure function of the
/// attempt count, so the retry contract is testable without timers.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * attempt
}

/// Outcome of one scope/language unit.
#[derive(Debug, Clone, Serialize)]
pub struct UnitOutcome {
    pub scope: String,
    pub language: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub signs_written: usize,
    pub attempts: u32,
}

/// One sign's generated content, as the provider must shape it. The
/// `career` field is persisted under the `money` column -- an
/// intentional remapping the stored schema has always used.
#[derive(Debug, Clone, Deserialize)]
pub struct SignContent {
    pub sign: String,
    pub general: String,
    pub love: String,
    pub career: String,
    pub health: String,
}

/// Scopes due on a given date when none is requested explicitly:
/// daily always, weekly on Mondays, monthly on the 1st.
pub fn scopes_for(date: NaiveDate) -> Vec<HoroscopeScope> {
    let mut scopes = vec![HoroscopeScope::Daily];
    if date.weekday() == Weekday::Mon {
        scopes.push(HoroscopeScope::Weekly);
    }
    if date.day() == 1 {
        scopes.push(HoroscopeScope::Monthly);
    }
    scopes
}

/// Human-readable period label used in the prompt.
pub fn period_label(scope: HoroscopeScope, date: NaiveDate) -> String {
    match scope {
        HoroscopeScope::Daily => date.format("%Y-%m-%d").to_string(),
        HoroscopeScope::Weekly => {
            let monday = date
                - ChronoDuration::days(date.weekday().num_days_from_monday() as i64);
            let sunday = monday + ChronoDuration::days(6);
            format!(
                "{} - {}",
                monday.format("%d.%m.%Y"),
                sunday.format("%d.%m.%Y")
            )
        }
        HoroscopeScope::Monthly => date.format("%Y-%m").to_string(),
    }
}

/// The aggregate prompt: one call, the whole sign set, strict JSON out.
pub fn build_batch_prompt(scope: HoroscopeScope, language: &str, date: NaiveDate) -> String {
    let period = match scope {
        HoroscopeScope::Daily => "daily",
        HoroscopeScope::Weekly => "weekly",
        HoroscopeScope::Monthly => "monthly",
    };
    let mut prompt = format!(
        "You are a professional astrologer. Write the {period} horoscope for every zodiac sign.\n\
         Period: {}\n\
         Write all text in the language identified by the code \"{language}\". Keep the tone warm, motivating, and rich with astrological vocabulary.\n\n\
         Respond with ONLY a JSON array -- no markdown, no commentary. The array must contain exactly {} objects, one per sign, using exactly these sign keys:\n",
        period_label(scope, date),
        ZODIAC_SIGNS.len(),
    );
    let _ = writeln!(prompt, "{}", ZODIAC_SIGNS.join(", "));
    prompt.push_str(
        "\nEach object must have exactly this shape:\n\
         {\"sign\": \"koc\", \"general\": \"...\", \"love\": \"...\", \"career\": \"...\", \"health\": \"...\"}",
    );
    prompt
}

/// Parse the provider's reply into sign entries, tolerating markdown
/// fences. Entries whose sign is not canonical are discarded.
pub fn parse_sign_entries(text: &str) -> Result<Vec<SignContent>, FallioError> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();
    let entries: Vec<SignContent> =
        serde_json::from_str(cleaned).map_err(|e| FallioError::MalformedResponse {
            message: format!("horoscope payload is not the required array shape: {e}"),
        })?;

    let mut valid = Vec::with_capacity(entries.len());
    for mut entry in entries {
        entry.sign = entry.sign.to_lowercase();
        if ZODIAC_SIGNS.contains(&entry.sign.as_str()) {
            valid.push(entry);
        } else {
            warn!(sign = %entry.sign, "discarding entry with unknown sign");
        }
    }
    Ok(valid)
}

/// Run the generator for each scope x language, sequentially.
pub async fn run_batch(
    db: &Database,
    provider: &dyn FortuneProvider,
    scopes: &[HoroscopeScope],
    date: NaiveDate,
    options: &HoroscopeOptions,
) -> Vec<UnitOutcome> {
    let model = if options.probe_models {
        probe_model(provider).await
    } else {
        None
    };

    let mut outcomes = Vec::new();
    for &scope in scopes {
        for language in &options.languages {
            let outcome =
                generate_unit(db, provider, scope, language, date, model.as_deref(), options)
                    .await;
            outcomes.push(outcome);
        }
    }
    outcomes
}

/// Ask the provider for its model list and take the top-ranked entry;
/// listing is already ordered by the faster/cheaper heuristics. Any
/// failure falls back to the adapter's configured default.
async fn probe_model(provider: &dyn FortuneProvider) -> Option<String> {
    match provider.list_models().await {
        Ok(models) => {
            let picked = models.into_iter().next();
            if let Some(ref model) = picked {
                info!(model, "model probe picked a generation model");
            }
            picked
        }
        Err(e) => {
            debug!(error = %e, "model probe failed, using configured default");
            None
        }
    }
}

/// One scope/language unit driven through the retry state machine.
async fn generate_unit(
    db: &Database,
    provider: &dyn FortuneProvider,
    scope: HoroscopeScope,
    language: &str,
    date: NaiveDate,
    model: Option<&str>,
    options: &HoroscopeOptions,
) -> UnitOutcome {
    let prompt = build_batch_prompt(scope, language, date);
    let request = GenerationRequest {
        system_prompt: String::new(),
        user_message: prompt,
        images: Vec::new(),
        model: model.map(|m| m.to_string()),
        max_tokens: options.max_tokens,
    };

    let mut state = UnitState::Pending;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        debug!(scope = %scope, language, attempts, state = ?state, "horoscope unit attempt");

        let text = match provider.generate(&request).await {
            Ok(text) => text,
            Err(e) if e.is_rate_limited() && attempts < options.max_attempts => {
                let delay = backoff_delay(options.base_delay, attempts);
                warn!(scope = %scope, language, attempts, delay_ms = delay.as_millis() as u64,
                    "rate limited, backing off before retry");
                state = UnitState::Retrying(attempts);
                tokio::time::sleep(delay).await;
                continue;
            }
            Err(e) if e.is_rate_limited() => {
                state = UnitState::Failed;
                debug!(scope = %scope, language, state = ?state, "unit exhausted retries");
                return UnitOutcome {
                    scope: scope.to_string(),
                    language: language.to_string(),
                    status: "error".into(),
                    error: Some(format!("max retries exceeded due to rate limits: {e}")),
                    signs_written: 0,
                    attempts,
                };
            }
            Err(e) => {
                // Non-rate-limit failures abort the unit immediately.
                state = UnitState::Failed;
                debug!(scope = %scope, language, state = ?state, "unit aborted");
                return UnitOutcome {
                    scope: scope.to_string(),
                    language: language.to_string(),
                    status: "error".into(),
                    error: Some(e.to_string()),
                    signs_written: 0,
                    attempts,
                };
            }
        };

        let entries = match parse_sign_entries(&text) {
            Ok(entries) => entries,
            Err(e) => {
                // Malformed shape: abort this unit, no retry.
                state = UnitState::Failed;
                debug!(scope = %scope, language, state = ?state, "unit aborted on parse");
                return UnitOutcome {
                    scope: scope.to_string(),
                    language: language.to_string(),
                    status: "error".into(),
                    error: Some(e.to_string()),
                    signs_written: 0,
                    attempts,
                };
            }
        };

        let mut written = 0usize;
        let mut storage_error = None;
        for entry in &entries {
            let row = HoroscopeEntry {
                sign: entry.sign.clone(),
                scope,
                effective_date: date.format("%Y-%m-%d").to_string(),
                language: language.to_string(),
                general: entry.general.clone(),
                love: entry.love.clone(),
                // Stored-schema remapping: generated "career" text lives
                // in the money column.
                money: entry.career.clone(),
                health: entry.health.clone(),
            };
            match horoscopes::upsert_entry(db, &row).await {
                Ok(()) => written += 1,
                Err(e) => {
                    storage_error = Some(e.to_string());
                    break;
                }
            }
        }

        if let Some(error) = storage_error {
            state = UnitState::Failed;
            debug!(scope = %scope, language, state = ?state, "unit aborted on storage");
            return UnitOutcome {
                scope: scope.to_string(),
                language: language.to_string(),
                status: "error".into(),
                error: Some(error),
                signs_written: written,
                attempts,
            };
        }

        state = UnitState::Succeeded;
        info!(scope = %scope, language, written, attempts, state = ?state, "horoscope unit complete");
        // Polite pause so consecutive batch calls stay under throughput limits.
        tokio::time::sleep(options.success_delay).await;
        return UnitOutcome {
            scope: scope.to_string(),
            language: language.to_string(),
            status: "success".into(),
            error: None,
            signs_written: written,
            attempts,
        };
    }
}
