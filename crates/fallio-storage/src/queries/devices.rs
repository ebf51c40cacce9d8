// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Push device registrations and push-target selection.

use fallio_core::FallioError;
use rusqlite::params;

use crate::database::Database;
use crate::models::PushTarget;

/// Register or refresh a device token for a user.
pub async fn upsert_device(
    db: &Database,
    user_id: &str,
    push_token: &str,
    is_active: bool,
) -> Result<(), FallioError> {
    let user_id = user_id.to_string();
    let push_token = push_token.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO user_devices (user_id, push_token, is_active, updated_at)
                 VALUES (?1, ?2, ?3, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ON CONFLICT(user_id, push_token) DO UPDATE SET
                     is_active = excluded.is_active,
                     updated_at = excluded.updated_at",
                params![user_id, push_token, is_active],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The user's most recently active device token, if any. Fortune
/// completion notifies exactly this one device.
pub async fn latest_active_token(
    db: &Database,
    user_id: &str,
) -> Result<Option<String>, FallioError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT push_token FROM user_devices
                 WHERE user_id = ?1 AND is_active = 1
                 ORDER BY updated_at DESC, id DESC
                 LIMIT 1",
            )?;
            let result = stmt.query_row(params![user_id], |row| row.get(0));
            match result {
                Ok(token) => Ok(Some(token)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Every active device of every user with a zodiac sign on file: the
/// audience for the daily horoscope push.
pub async fn zodiac_push_targets(db: &Database) -> Result<Vec<PushTarget>, FallioError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.id, u.full_name, u.zodiac_sign, d.push_token
                 FROM users u
                 JOIN user_devices d ON d.user_id = u.id AND d.is_active = 1
                 WHERE u.zodiac_sign IS NOT NULL
                 ORDER BY u.id, d.id",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(PushTarget {
                    user_id: row.get(0)?,
                    full_name: row.get(1)?,
                    zodiac_sign: row.get(2)?,
                    push_token: row.get(3)?,
                })
            })?;
            let mut targets = Vec::new();
            for row in rows {
                targets.push(row?);
            }
            Ok(targets)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RequesterProfile;
    use crate::queries::users;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn latest_active_token_skips_inactive_devices() {
        let (db, _dir) = setup_db().await;
        users::upsert_user(&db, "u1", None, &RequesterProfile::default())
            .await
            .unwrap();

        upsert_device(&db, "u1", "token-old", true).await.unwrap();
        upsert_device(&db, "u1", "token-dead", false).await.unwrap();

        let token = latest_active_token(&db, "u1").await.unwrap();
        assert_eq!(token.as_deref(), Some("token-old"));

        assert!(latest_active_token(&db, "u2").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn zodiac_push_targets_requires_sign_and_active_device() {
        let (db, _dir) = setup_db().await;

        users::upsert_user(
            &db,
            "with-sign",
            Some("Ayse"),
            &RequesterProfile {
                zodiac_sign: Some("aslan".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        users::upsert_user(&db, "no-sign", None, &RequesterProfile::default())
            .await
            .unwrap();

        upsert_device(&db, "with-sign", "t1", true).await.unwrap();
        upsert_device(&db, "with-sign", "t2", true).await.unwrap();
        upsert_device(&db, "no-sign", "t3", true).await.unwrap();

        let targets = zodiac_push_targets(&db).await.unwrap();
        assert_eq!(targets.len(), 2);
        assert!(targets.iter().all(|t| t.user_id == "with-sign"));
        assert!(targets.iter().all(|t| t.zodiac_sign == "aslan"));

        db.close().await.unwrap();
    }
}
