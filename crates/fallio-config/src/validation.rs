// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic validation applied after deserialization.
//!
//! Figment/serde catch type errors and unknown keys; this layer catches
//! values that parse fine but cannot work at runtime.

use fallio_core::FallioError;

use crate::model::FallioConfig;

/// Validate a loaded configuration, collecting every problem found.
pub fn validate(config: &FallioConfig) -> Result<(), FallioError> {
    let mut problems = Vec::new();

    const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    if !LEVELS.contains(&config.log_level.as_str()) {
        problems.push(format!(
            "log_level must be one of {LEVELS:?}, got {:?}",
            config.log_level
        ));
    }

    if config.generation.queue_batch_size == 0 {
        problems.push("generation.queue_batch_size must be at least 1".to_string());
    }

    if config.horoscope.retry_max_attempts == 0 {
        problems.push("horoscope.retry_max_attempts must be at least 1".to_string());
    }

    if config.horoscope.languages.is_empty() {
        problems.push("horoscope.languages must name at least one language".to_string());
    }

    if config.push.chunk_size == 0 {
        problems.push("push.chunk_size must be at least 1".to_string());
    }

    for (name, url) in [
        ("storage.object_store_url", &config.storage.object_store_url),
        ("push.endpoint", &config.push.endpoint),
    ] {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            problems.push(format!("{name} must be an http(s) URL, got {url:?}"));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(FallioError::Config(problems.join("; ")))
    }
}
