// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the generation triggers.
//!
//! Each handler loads the provider settings row fresh and builds its own
//! orchestrator, so admin changes take effect on the next invocation
//! without a restart.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use fallio_core::{FallioError, GenerationRequest, HoroscopeScope};
use fallio_engine::consumer::{QueueOptions, QueueReport};
use fallio_engine::horoscope::{HoroscopeOptions, UnitOutcome};
use fallio_engine::{
    HttpObjectStore, Orchestrator, ProviderModels, PushClient, daily_horoscope_push,
    fetch_image_parts, model_catalog, process_queue, run_batch, scopes_for,
    teller_model_override,
};
use fallio_prompt::{ContextParts, GenerationContext, build_system_prompt, build_user_message};
use fallio_storage::queries::{fortunes, personas, settings, tellers};

use crate::server::GatewayState;

/// Request body for POST /v1/fortunes/generate.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Existing fortune to resolve teller preference and images from.
    #[serde(default)]
    pub fortune_id: Option<String>,
    /// Free-text fortune type (the only required field).
    pub fortune_type: String,
    #[serde(default)]
    pub user_note: Option<String>,
    #[serde(default)]
    pub zodiac_sign: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub relationship_status: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Success body for POST /v1/fortunes/generate.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub response: String,
}

/// Error body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Query parameters for POST /v1/cron/horoscopes.
#[derive(Debug, Deserialize)]
pub struct HoroscopeParams {
    #[serde(default)]
    pub scope: Option<String>,
}

/// Response body for POST /v1/cron/horoscopes.
#[derive(Debug, Serialize)]
pub struct HoroscopeReport {
    pub processed: Vec<UnitOutcome>,
}

/// Query parameters for POST /v1/cron/horoscope-push.
#[derive(Debug, Deserialize)]
pub struct HoroscopePushParams {
    #[serde(default)]
    pub lang: Option<String>,
}

/// Response body for POST /v1/cron/horoscope-push.
#[derive(Debug, Serialize)]
pub struct HoroscopePushReport {
    pub success: bool,
    pub count: usize,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

fn internal_error(e: FallioError) -> Response {
    error!(error = %e, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

/// POST /v1/fortunes/generate
///
/// Runs one synchronous generation for the admin surface: resolve the
/// assigned teller's preference, fetch attachments, assemble prompts,
/// walk the provider chain. Total exhaustion surfaces the aggregated
/// reason string.
pub async fn post_generate(
    State(state): State<GatewayState>,
    Json(body): Json<GenerateRequest>,
) -> Response {
    match generate_fortune(&state, body).await {
        Ok(text) => (StatusCode::OK, Json(GenerateResponse { response: text })).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn generate_fortune(
    state: &GatewayState,
    body: GenerateRequest,
) -> Result<String, FallioError> {
    let provider_settings = settings::load_settings(&state.db).await?;

    let teller = match &body.fortune_id {
        Some(id) => tellers::teller_for_fortune(&state.db, id).await?,
        None => None,
    };
    let preferred = Orchestrator::resolve_preferred(teller.as_ref(), &provider_settings);

    let images = match &body.fortune_id {
        Some(id) => {
            let urls = fortunes::image_urls(&state.db, id).await?;
            let store = HttpObjectStore::new(
                &state.config.storage.object_store_url,
                &state.config.storage.image_bucket,
            )?;
            fetch_image_parts(&store, &urls, &state.config.storage.image_bucket).await
        }
        None => Vec::new(),
    };

    let context = GenerationContext::build(ContextParts {
        fortune_type: body.fortune_type,
        zodiac_sign: body.zodiac_sign,
        gender: body.gender,
        job: body.job,
        relationship_status: body.relationship_status,
        note: body.user_note,
        metadata: body.metadata,
        language: body.language.or_else(|| {
            Some(state.config.generation.default_language.clone())
        }),
        image_count: images.len(),
    });

    let persona = personas::get_persona(&state.db, context.category.key()).await?;
    let request = GenerationRequest {
        system_prompt: build_system_prompt(&context, persona.as_ref().map(|p| p.body.as_str())),
        user_message: build_user_message(&context),
        images,
        model: teller.as_ref().and_then(teller_model_override),
        max_tokens: state.config.generation.max_tokens,
    };

    let orchestrator = Orchestrator::from_settings(&provider_settings)?;
    let outcome = orchestrator.run(&request, preferred).await?;
    Ok(outcome.text)
}

/// POST /v1/cron/fortunes
///
/// Drains one bounded batch of the pending queue and reports per-item
/// outcomes. Item failures are part of the report, not an HTTP error.
pub async fn post_process_fortunes(State(state): State<GatewayState>) -> Response {
    match run_queue(&state).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn run_queue(state: &GatewayState) -> Result<QueueReport, FallioError> {
    let provider_settings = settings::load_settings(&state.db).await?;
    let orchestrator = Orchestrator::from_settings(&provider_settings)?;
    let store = HttpObjectStore::new(
        &state.config.storage.object_store_url,
        &state.config.storage.image_bucket,
    )?;
    let push = PushClient::new(&state.config.push.endpoint, state.config.push.chunk_size)?;
    let options = QueueOptions::from_config(&state.config);

    process_queue(
        &state.db,
        &store,
        &push,
        &orchestrator,
        &provider_settings,
        &options,
    )
    .await
}

/// POST /v1/cron/horoscopes
///
/// Runs the batch generator. An explicit `scope` query parameter limits
/// the run; otherwise the invocation date decides (daily always, weekly
/// on Mondays, monthly on the 1st).
pub async fn post_horoscopes(
    State(state): State<GatewayState>,
    Query(params): Query<HoroscopeParams>,
) -> Response {
    let scopes = match &params.scope {
        Some(raw) => match raw.parse::<HoroscopeScope>() {
            Ok(scope) => vec![scope],
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: format!("unknown scope {raw:?}; expected daily, weekly, or monthly"),
                    }),
                )
                    .into_response();
            }
        },
        None => scopes_for(chrono::Utc::now().date_naive()),
    };

    match run_horoscopes(&state, &scopes).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn run_horoscopes(
    state: &GatewayState,
    scopes: &[HoroscopeScope],
) -> Result<HoroscopeReport, FallioError> {
    let provider_settings = settings::load_settings(&state.db).await?;
    let orchestrator = Orchestrator::from_settings(&provider_settings)?;
    let active = provider_settings.active_kind();
    let provider = orchestrator
        .provider(active)
        .ok_or_else(|| FallioError::Internal(format!("{active} adapter is not registered")))?;

    let options = HoroscopeOptions::from_config(
        &state.config.horoscope,
        state.config.generation.max_tokens,
    );
    let processed = run_batch(
        &state.db,
        provider,
        scopes,
        chrono::Utc::now().date_naive(),
        &options,
    )
    .await;
    Ok(HoroscopeReport { processed })
}

/// POST /v1/cron/horoscope-push
///
/// Sends the daily horoscope teaser to every eligible device.
pub async fn post_horoscope_push(
    State(state): State<GatewayState>,
    Query(params): Query<HoroscopePushParams>,
) -> Response {
    let lang = params
        .lang
        .unwrap_or_else(|| state.config.generation.default_language.clone());

    let push = match PushClient::new(&state.config.push.endpoint, state.config.push.chunk_size) {
        Ok(push) => push,
        Err(e) => return internal_error(e),
    };

    match daily_horoscope_push(&state.db, &push, &lang).await {
        Ok(count) => (
            StatusCode::OK,
            Json(HoroscopePushReport {
                success: true,
                count,
            }),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /v1/models
///
/// The provider model catalog for the admin picker.
pub async fn get_models(State(state): State<GatewayState>) -> Response {
    match load_catalog(&state).await {
        Ok(catalog) => (StatusCode::OK, Json(catalog)).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn load_catalog(state: &GatewayState) -> Result<ProviderModels, FallioError> {
    let provider_settings = settings::load_settings(&state.db).await?;
    let orchestrator = Orchestrator::from_settings(&provider_settings)?;
    Ok(model_catalog(&orchestrator).await)
}

/// GET /health
///
/// Public liveness probe.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
