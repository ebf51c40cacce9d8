// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for layered config loading.

use fallio_config::{load_config_from_str, validate};

#[test]
fn empty_toml_yields_defaults() {
    let config = load_config_from_str("").unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8420);
    assert_eq!(config.generation.max_tokens, 1024);
    assert_eq!(config.horoscope.success_delay_ms, 12_000);
    assert!(config.horoscope.probe_models);
}

#[test]
fn toml_overrides_defaults() {
    let config = load_config_from_str(
        r#"
        log_level = "debug"

        [server]
        host = "0.0.0.0"
        port = 9000
        bearer_token = "cron-secret"

        [generation]
        queue_batch_size = 10
        queue_item_delay_ms = 250

        [horoscope]
        languages = ["tr", "en"]
        retry_base_delay_ms = 500
        "#,
    )
    .unwrap();

    assert_eq!(config.log_level, "debug");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.bearer_token.as_deref(), Some("cron-secret"));
    assert_eq!(config.generation.queue_batch_size, 10);
    assert_eq!(config.generation.queue_item_delay_ms, 250);
    assert_eq!(config.horoscope.languages, vec!["tr", "en"]);
    assert_eq!(config.horoscope.retry_base_delay_ms, 500);
    // Untouched sections keep their defaults.
    assert_eq!(config.push.chunk_size, 100);
}

#[test]
fn unknown_section_key_is_an_error() {
    let result = load_config_from_str(
        r#"
        [server]
        hosting = "typo"
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn partial_sections_merge_with_defaults() {
    let config = load_config_from_str(
        r#"
        [storage]
        database_path = "/var/lib/fallio/fallio.db"
        "#,
    )
    .unwrap();
    assert_eq!(config.storage.database_path, "/var/lib/fallio/fallio.db");
    assert_eq!(config.storage.image_bucket, "fortune-images");
}

#[test]
fn loaded_defaults_pass_validation() {
    let config = load_config_from_str("").unwrap();
    assert!(validate(&config).is_ok());
}
