// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona lookups by normalized fortune-type key.

use fallio_core::FallioError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Persona;

/// Insert or replace a persona body for a category key.
pub async fn upsert_persona(db: &Database, persona: &Persona) -> Result<(), FallioError> {
    let persona = persona.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO personas (key, body, description)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                     body = excluded.body,
                     description = excluded.description",
                params![persona.key, persona.body, persona.description],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The persona stored for a category key, or `None` when the built-in
/// default should apply.
pub async fn get_persona(db: &Database, key: &str) -> Result<Option<Persona>, FallioError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT key, body, description FROM personas WHERE key = ?1")?;
            let result = stmt.query_row(params![key], |row| {
                Ok(Persona {
                    key: row.get(0)?,
                    body: row.get(1)?,
                    description: row.get(2)?,
                })
            });
            match result {
                Ok(persona) => Ok(Some(persona)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
