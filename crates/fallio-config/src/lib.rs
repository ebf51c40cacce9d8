// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Fallio fortune platform.
//!
//! Layered loading (compiled defaults -> system TOML -> XDG TOML -> local
//! TOML -> `FALLIO_*` env vars) via Figment, strict models that reject
//! unknown keys, and a semantic validation pass.

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::FallioConfig;
pub use validation::validate;

use fallio_core::FallioError;

/// Load configuration from the standard hierarchy and validate it.
///
/// The usual entry point for binaries: one call, one error to print.
pub fn load_and_validate() -> Result<FallioConfig, FallioError> {
    let config = load_config().map_err(|e| FallioError::Config(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}
