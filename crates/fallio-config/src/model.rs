// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Fallio fortune platform.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. Provider API keys do NOT live here: they are
//! admin-managed rows in the `provider_settings` table, loaded per
//! invocation by the engine.

use serde::{Deserialize, Serialize};

/// Top-level Fallio configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FallioConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database and object storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Fortune generation and queue settings.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Horoscope batch generator settings.
    #[serde(default)]
    pub horoscope: HoroscopeConfig,

    /// Push notification settings.
    #[serde(default)]
    pub push: PushConfig,
}

impl Default for FallioConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            generation: GenerationConfig::default(),
            horoscope: HoroscopeConfig::default(),
            push: PushConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token protecting the trigger endpoints. `None` disables auth.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8420
}

/// Database and object storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Base URL of the object storage public read endpoint.
    #[serde(default = "default_object_store_url")]
    pub object_store_url: String,

    /// Bucket holding user-submitted fortune images. Stored image URLs
    /// are resolved to keys relative to this bucket.
    #[serde(default = "default_image_bucket")]
    pub image_bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            object_store_url: default_object_store_url(),
            image_bucket: default_image_bucket(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("fallio/fallio.db").to_string_lossy().into_owned())
        .unwrap_or_else(|| "fallio.db".to_string())
}

fn default_object_store_url() -> String {
    "http://127.0.0.1:9000/storage/v1/object/public".to_string()
}

fn default_image_bucket() -> String {
    "fortune-images".to_string()
}

/// Fortune generation and queue consumer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Maximum tokens per generation call.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// How many pending fortunes one queue run picks up.
    #[serde(default = "default_queue_batch_size")]
    pub queue_batch_size: u32,

    /// Delay between queue items, to avoid bursting provider rate limits.
    #[serde(default = "default_queue_item_delay_ms")]
    pub queue_item_delay_ms: u64,

    /// Language used when a fortune carries no language of its own.
    #[serde(default = "default_language")]
    pub default_language: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            queue_batch_size: default_queue_batch_size(),
            queue_item_delay_ms: default_queue_item_delay_ms(),
            default_language: default_language(),
        }
    }
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_queue_batch_size() -> u32 {
    5
}

fn default_queue_item_delay_ms() -> u64 {
    1000
}

fn default_language() -> String {
    "tr".to_string()
}

/// Horoscope batch generator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HoroscopeConfig {
    /// Languages to generate per scope.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    /// Maximum attempts per scope/language on rate-limited failures.
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,

    /// Backoff base: attempt N waits `retry_base_delay_ms * N`.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Polite delay after every successful batch call.
    #[serde(default = "default_success_delay_ms")]
    pub success_delay_ms: u64,

    /// Whether to probe the provider's model-list endpoint before
    /// generating, preferring faster models by substring heuristics.
    #[serde(default = "default_probe_models")]
    pub probe_models: bool,
}

impl Default for HoroscopeConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            success_delay_ms: default_success_delay_ms(),
            probe_models: default_probe_models(),
        }
    }
}

fn default_languages() -> Vec<String> {
    vec!["tr".to_string()]
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    15_000
}

fn default_success_delay_ms() -> u64 {
    12_000
}

fn default_probe_models() -> bool {
    true
}

/// Push notification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PushConfig {
    /// Push service send endpoint (Expo-compatible).
    #[serde(default = "default_push_endpoint")]
    pub endpoint: String,

    /// How many messages one send request carries.
    #[serde(default = "default_push_chunk_size")]
    pub chunk_size: usize,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            endpoint: default_push_endpoint(),
            chunk_size: default_push_chunk_size(),
        }
    }
}

fn default_push_endpoint() -> String {
    "https://exp.host/--/api/v2/push/send".to_string()
}

fn default_push_chunk_size() -> usize {
    100
}
