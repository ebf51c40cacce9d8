// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider settings: the single admin-managed row holding API keys,
//! default models, and the active-provider selector.

use fallio_core::FallioError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{ProviderCredentials, ProviderSettings};

/// Load the settings row. A missing row yields empty defaults, which the
/// orchestrator reports as missing credentials rather than failing here.
pub async fn load_settings(db: &Database) -> Result<ProviderSettings, FallioError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT active_provider,
                        gemini_api_key, gemini_model,
                        openai_api_key, openai_model,
                        claude_api_key, claude_model
                 FROM provider_settings WHERE id = 1",
            )?;
            let result = stmt.query_row([], |row| {
                Ok(ProviderSettings {
                    active_provider: row.get(0)?,
                    gemini: ProviderCredentials {
                        api_key: row.get(1)?,
                        model: row.get(2)?,
                    },
                    openai: ProviderCredentials {
                        api_key: row.get(3)?,
                        model: row.get(4)?,
                    },
                    claude: ProviderCredentials {
                        api_key: row.get(5)?,
                        model: row.get(6)?,
                    },
                })
            });
            match result {
                Ok(settings) => Ok(settings),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(ProviderSettings::default()),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Write the settings row (admin surface only).
pub async fn save_settings(db: &Database, settings: &ProviderSettings) -> Result<(), FallioError> {
    let settings = settings.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO provider_settings (id, active_provider,
                     gemini_api_key, gemini_model,
                     openai_api_key, openai_model,
                     claude_api_key, claude_model,
                     updated_at)
                 VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                     strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ON CONFLICT(id) DO UPDATE SET
                     active_provider = excluded.active_provider,
                     gemini_api_key = excluded.gemini_api_key,
                     gemini_model = excluded.gemini_model,
                     openai_api_key = excluded.openai_api_key,
                     openai_model = excluded.openai_model,
                     claude_api_key = excluded.claude_api_key,
                     claude_model = excluded.claude_model,
                     updated_at = excluded.updated_at",
                params![
                    settings.active_provider,
                    settings.gemini.api_key,
                    settings.gemini.model,
                    settings.openai.api_key,
                    settings.openai.model,
                    settings.claude.api_key,
                    settings.claude.model,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
