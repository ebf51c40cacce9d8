// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Teller lookups. Tellers are written by the admin surface; the engine
//! only reads them.

use fallio_core::FallioError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Teller;

/// Insert or replace a teller row.
pub async fn upsert_teller(db: &Database, teller: &Teller) -> Result<(), FallioError> {
    let teller = teller.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO tellers (id, name, is_ai, provider, model)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     is_ai = excluded.is_ai,
                     provider = excluded.provider,
                     model = excluded.model",
                params![teller.id, teller.name, teller.is_ai, teller.provider, teller.model],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The teller assigned to a fortune, if any.
pub async fn teller_for_fortune(
    db: &Database,
    fortune_id: &str,
) -> Result<Option<Teller>, FallioError> {
    let fortune_id = fortune_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT t.id, t.name, t.is_ai, t.provider, t.model
                 FROM tellers t
                 JOIN fortunes f ON f.teller_id = t.id
                 WHERE f.id = ?1",
            )?;
            let result = stmt.query_row(params![fortune_id], |row| {
                Ok(Teller {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    is_ai: row.get(2)?,
                    provider: row.get(3)?,
                    model: row.get(4)?,
                })
            });
            match result {
                Ok(teller) => Ok(Some(teller)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Fortune, RequesterProfile};
    use crate::queries::{fortunes, users};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn teller_for_fortune_resolves_through_assignment() {
        let (db, _dir) = setup_db().await;

        users::upsert_user(&db, "u1", None, &RequesterProfile::default())
            .await
            .unwrap();
        upsert_teller(
            &db,
            &Teller {
                id: "t1".into(),
                name: "Madame Zehra".into(),
                is_ai: true,
                provider: Some("chatgpt".into()),
                model: Some("gpt-4o".into()),
            },
        )
        .await
        .unwrap();
        fortunes::create_fortune(
            &db,
            &Fortune {
                id: "f1".into(),
                user_id: "u1".into(),
                teller_id: Some("t1".into()),
                fortune_type: "coffee".into(),
                user_note: None,
                metadata: None,
                status: "pending".into(),
                response: None,
                is_read: false,
                created_at: "2026-02-01T00:00:00.000Z".into(),
                completed_at: None,
            },
        )
        .await
        .unwrap();

        let teller = teller_for_fortune(&db, "f1").await.unwrap().unwrap();
        assert_eq!(teller.name, "Madame Zehra");
        assert_eq!(teller.provider.as_deref(), Some("chatgpt"));

        assert!(teller_for_fortune(&db, "f-missing").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn upsert_overwrites_existing_row() {
        let (db, _dir) = setup_db().await;
        let mut teller = Teller {
            id: "t1".into(),
            name: "Old Name".into(),
            is_ai: false,
            provider: None,
            model: None,
        };
        upsert_teller(&db, &teller).await.unwrap();
        teller.name = "New Name".into();
        teller.is_ai = true;
        upsert_teller(&db, &teller).await.unwrap();

        let count: i64 = db
            .connection()
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM tellers", [], |r| r.get(0)))
            .await
            .unwrap();
        assert_eq!(count, 1);
        db.close().await.unwrap();
    }
}
