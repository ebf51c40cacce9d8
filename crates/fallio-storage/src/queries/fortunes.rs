// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fortune request operations: queue selection, completion, image refs.

use fallio_core::FallioError;
use rusqlite::{Row, params};

use crate::database::Database;
use crate::models::{Fortune, PendingFortune, RequesterProfile, Teller};

fn fortune_from_row(row: &Row<'_>) -> Result<Fortune, rusqlite::Error> {
    Ok(Fortune {
        id: row.get(0)?,
        user_id: row.get(1)?,
        teller_id: row.get(2)?,
        fortune_type: row.get(3)?,
        user_note: row.get(4)?,
        metadata: row.get(5)?,
        status: row.get(6)?,
        response: row.get(7)?,
        is_read: row.get(8)?,
        created_at: row.get(9)?,
        completed_at: row.get(10)?,
    })
}

const FORTUNE_COLUMNS: &str = "id, user_id, teller_id, fortune_type, user_note, metadata,
     status, response, is_read, created_at, completed_at";

/// Insert a new fortune request. Rows arrive from the mobile client; the
/// engine only ever moves them to `completed`.
pub async fn create_fortune(db: &Database, fortune: &Fortune) -> Result<(), FallioError> {
    let fortune = fortune.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO fortunes (id, user_id, teller_id, fortune_type, user_note,
                     metadata, status, response, is_read, created_at, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    fortune.id,
                    fortune.user_id,
                    fortune.teller_id,
                    fortune.fortune_type,
                    fortune.user_note,
                    fortune.metadata,
                    fortune.status,
                    fortune.response,
                    fortune.is_read,
                    fortune.created_at,
                    fortune.completed_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a fortune by ID.
pub async fn get_fortune(db: &Database, id: &str) -> Result<Option<Fortune>, FallioError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {FORTUNE_COLUMNS} FROM fortunes WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], fortune_from_row);
            match result {
                Ok(fortune) => Ok(Some(fortune)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Select up to `limit` pending fortunes assigned to AI tellers, oldest
/// first, joined with requester attributes and teller overrides.
///
/// Completed fortunes and fortunes assigned to human tellers never match,
/// which is what keeps completion from running twice.
pub async fn pending_ai_fortunes(
    db: &Database,
    limit: u32,
) -> Result<Vec<PendingFortune>, FallioError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT f.id, f.user_id, f.teller_id, f.fortune_type, f.user_note,
                        f.metadata, f.status, f.response, f.is_read, f.created_at,
                        f.completed_at,
                        u.zodiac_sign, u.gender, u.job, u.relationship_status,
                        t.id, t.name, t.is_ai, t.provider, t.model
                 FROM fortunes f
                 JOIN users u ON u.id = f.user_id
                 JOIN tellers t ON t.id = f.teller_id
                 WHERE f.status = 'pending' AND t.is_ai = 1
                 ORDER BY f.created_at ASC
                 LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| {
                Ok(PendingFortune {
                    fortune: fortune_from_row(row)?,
                    requester: RequesterProfile {
                        zodiac_sign: row.get(11)?,
                        gender: row.get(12)?,
                        job: row.get(13)?,
                        relationship_status: row.get(14)?,
                    },
                    teller: Teller {
                        id: row.get(15)?,
                        name: row.get(16)?,
                        is_ai: row.get(17)?,
                        provider: row.get(18)?,
                        model: row.get(19)?,
                    },
                })
            })?;
            let mut pending = Vec::new();
            for row in rows {
                pending.push(row?);
            }
            Ok(pending)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Persist a completed generation: response text, completed status and
/// timestamp, and a cleared read flag.
pub async fn complete_fortune(
    db: &Database,
    id: &str,
    response: &str,
) -> Result<(), FallioError> {
    let id = id.to_string();
    let response = response.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE fortunes SET response = ?1, status = 'completed',
                     completed_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                     is_read = 0
                 WHERE id = ?2",
                params![response, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Attach a stored-image URL to a fortune.
pub async fn add_image(db: &Database, fortune_id: &str, url: &str) -> Result<(), FallioError> {
    let fortune_id = fortune_id.to_string();
    let url = url.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO fortune_images (fortune_id, url) VALUES (?1, ?2)",
                params![fortune_id, url],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Stored-image URLs for a fortune, in insertion order.
pub async fn image_urls(db: &Database, fortune_id: &str) -> Result<Vec<String>, FallioError> {
    let fortune_id = fortune_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT url FROM fortune_images WHERE fortune_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![fortune_id], |row| row.get(0))?;
            let mut urls = Vec::new();
            for row in rows {
                urls.push(row?);
            }
            Ok(urls)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
