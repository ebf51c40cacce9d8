// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User rows: requester attributes consumed when building generation context.

use fallio_core::FallioError;
use rusqlite::params;

use crate::database::Database;
use crate::models::RequesterProfile;

/// Insert or replace a user row.
pub async fn upsert_user(
    db: &Database,
    id: &str,
    full_name: Option<&str>,
    profile: &RequesterProfile,
) -> Result<(), FallioError> {
    let id = id.to_string();
    let full_name = full_name.map(|s| s.to_string());
    let profile = profile.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (id, full_name, zodiac_sign, gender, job, relationship_status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                     full_name = excluded.full_name,
                     zodiac_sign = excluded.zodiac_sign,
                     gender = excluded.gender,
                     job = excluded.job,
                     relationship_status = excluded.relationship_status",
                params![
                    id,
                    full_name,
                    profile.zodiac_sign,
                    profile.gender,
                    profile.job,
                    profile.relationship_status,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
