// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./fallio.toml` > `~/.config/fallio/fallio.toml` >
//! `/etc/fallio/fallio.toml` with environment variable overrides via the
//! `FALLIO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::FallioConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/fallio/fallio.toml` (system-wide)
/// 3. `~/.config/fallio/fallio.toml` (user XDG config)
/// 4. `./fallio.toml` (local directory)
/// 5. `FALLIO_*` environment variables
pub fn load_config() -> Result<FallioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FallioConfig::default()))
        .merge(Toml::file("/etc/fallio/fallio.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("fallio/fallio.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("fallio.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<FallioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FallioConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FallioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FallioConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `FALLIO_SERVER_BEARER_TOKEN` must map
/// to `server.bearer_token`, not `server.bearer.token`.
fn env_provider() -> Env {
    Env::prefixed("FALLIO_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: FALLIO_STORAGE_DATABASE_PATH -> "storage_database_path"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("generation_", "generation.", 1)
            .replacen("horoscope_", "horoscope.", 1)
            .replacen("push_", "push.", 1);
        mapped.into()
    })
}
