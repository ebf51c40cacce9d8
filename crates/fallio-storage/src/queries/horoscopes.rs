// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Horoscope entry upserts keyed on (sign, scope, effective_date, language).

use fallio_core::{FallioError, HoroscopeScope};
use rusqlite::params;

use crate::database::Database;
use crate::models::HoroscopeEntry;

/// Upsert one horoscope entry. Re-running a batch overwrites content on
/// the composite key instead of duplicating rows, which is what makes the
/// generator idempotent.
pub async fn upsert_entry(db: &Database, entry: &HoroscopeEntry) -> Result<(), FallioError> {
    let entry = entry.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO horoscopes (sign, scope, effective_date, language,
                     general, love, money, health, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8,
                     strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ON CONFLICT(sign, scope, effective_date, language) DO UPDATE SET
                     general = excluded.general,
                     love = excluded.love,
                     money = excluded.money,
                     health = excluded.health,
                     updated_at = excluded.updated_at",
                params![
                    entry.sign,
                    entry.scope.to_string(),
                    entry.effective_date,
                    entry.language,
                    entry.general,
                    entry.love,
                    entry.money,
                    entry.health,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one entry by its composite key.
pub async fn get_entry(
    db: &Database,
    sign: &str,
    scope: HoroscopeScope,
    effective_date: &str,
    language: &str,
) -> Result<Option<HoroscopeEntry>, FallioError> {
    let sign = sign.to_string();
    let scope_str = scope.to_string();
    let effective_date = effective_date.to_string();
    let language = language.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT sign, scope, effective_date, language, general, love, money, health
                 FROM horoscopes
                 WHERE sign = ?1 AND scope = ?2 AND effective_date = ?3 AND language = ?4",
            )?;
            let result = stmt.query_row(
                params![sign, scope_str, effective_date, language],
                |row| {
                    let scope_text: String = row.get(1)?;
                    Ok(HoroscopeEntry {
                        sign: row.get(0)?,
                        scope: scope_text.parse().unwrap_or(HoroscopeScope::Daily),
                        effective_date: row.get(2)?,
                        language: row.get(3)?,
                        general: row.get(4)?,
                        love: row.get(5)?,
                        money: row.get(6)?,
                        health: row.get(7)?,
                    })
                },
            );
            match result {
                Ok(entry) => Ok(Some(entry)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The most recent daily "general" text for a sign and language, used by
/// the morning push job.
pub async fn latest_daily_general(
    db: &Database,
    sign: &str,
    language: &str,
) -> Result<Option<String>, FallioError> {
    let sign = sign.to_string();
    let language = language.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT general FROM horoscopes
                 WHERE sign = ?1 AND scope = 'daily' AND language = ?2
                 ORDER BY effective_date DESC
                 LIMIT 1",
            )?;
            let result = stmt.query_row(params![sign, language], |row| row.get(0));
            match result {
                Ok(general) => Ok(Some(general)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
