// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Push notification dispatch (Expo-compatible) and the daily horoscope
//! push job.
//!
//! Everything here is best-effort from the engine's perspective: a push
//! failure is logged and never rolls back the work that triggered it.

use std::time::Duration;

use fallio_core::FallioError;
use fallio_storage::Database;
use fallio_storage::queries::{devices, horoscopes};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

/// One push message in the Expo send format.
#[derive(Debug, Clone, Serialize)]
pub struct PushMessage {
    pub to: String,
    pub sound: String,
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
}

/// Client for the push send endpoint.
pub struct PushClient {
    client: reqwest::Client,
    endpoint: String,
    chunk_size: usize,
}

impl PushClient {
    /// Creates a client for the configured endpoint.
    pub fn new(endpoint: &str, chunk_size: usize) -> Result<Self, FallioError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FallioError::Http {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            chunk_size: chunk_size.max(1),
        })
    }

    /// Sends a single message.
    pub async fn send(&self, message: &PushMessage) -> Result<(), FallioError> {
        self.post_chunk(std::slice::from_ref(message)).await
    }

    /// Sends messages in chunks sized for the push service. Returns how
    /// many messages were handed off.
    pub async fn send_batch(&self, messages: &[PushMessage]) -> Result<usize, FallioError> {
        for chunk in messages.chunks(self.chunk_size) {
            self.post_chunk(chunk).await?;
        }
        Ok(messages.len())
    }

    async fn post_chunk(&self, chunk: &[PushMessage]) -> Result<(), FallioError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(chunk)
            .send()
            .await
            .map_err(|e| FallioError::Http {
                message: format!("push send failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FallioError::Http {
                message: format!("push endpoint returned {status}: {body}"),
                source: None,
            });
        }
        debug!(count = chunk.len(), "push chunk accepted");
        Ok(())
    }
}

/// Notify a requester that their fortune is ready, on their most
/// recently active device. Returns false when the user has no device.
pub async fn notify_fortune_completed(
    db: &Database,
    push: &PushClient,
    user_id: &str,
    fortune_id: &str,
) -> Result<bool, FallioError> {
    let Some(token) = devices::latest_active_token(db, user_id).await? else {
        debug!(user_id, "no active device, skipping completion push");
        return Ok(false);
    };

    let message = PushMessage {
        to: token,
        sound: "default".into(),
        title: "Falınız Yorumlandı! 🔮".into(),
        body: "Falcı yorumunu yaptı. Hemen sonuçları görmek için tıkla!".into(),
        data: json!({ "url": format!("/fortune/result/{fortune_id}") }),
    };
    push.send(&message).await?;
    Ok(true)
}

/// Morning greeting carrying today's horoscope teaser, localized.
fn daily_greeting(lang: &str, full_name: Option<&str>, sign: &str) -> (String, String) {
    let name = full_name.unwrap_or("");
    if lang == "tr" {
        (
            "Günlük Burç Yorumun".to_string(),
            format!("Günaydın {name}! Bugün {sign} burcu için harika bir gün. İşte yorumun..."),
        )
    } else {
        (
            "Daily Horoscope".to_string(),
            format!("Good morning {name}! Stars are aligned for {sign} today. Here is your reading..."),
        )
    }
}

/// The daily horoscope push job: every active device of every user with
/// a zodiac sign gets a teaser for today's reading in `lang`. Users
/// whose sign has no stored daily entry are skipped.
pub async fn daily_horoscope_push(
    db: &Database,
    push: &PushClient,
    lang: &str,
) -> Result<usize, FallioError> {
    let targets = devices::zodiac_push_targets(db).await?;
    info!(targets = targets.len(), lang, "daily horoscope push starting");

    let mut messages = Vec::new();
    for target in targets {
        let sign = target.zodiac_sign.to_lowercase();
        let entry = horoscopes::latest_daily_general(db, &sign, lang).await?;
        if entry.is_none() {
            warn!(sign = %sign, lang, "no daily horoscope stored, skipping user");
            continue;
        }

        let (title, body) = daily_greeting(lang, target.full_name.as_deref(), &target.zodiac_sign);
        messages.push(PushMessage {
            to: target.push_token,
            sound: "default".into(),
            title,
            body,
            data: json!({ "type": "horoscope", "sign": target.zodiac_sign }),
        });
    }

    if messages.is_empty() {
        return Ok(0);
    }
    let sent = push.send_batch(&messages).await?;
    info!(sent, "daily horoscope push complete");
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fallio_core::HoroscopeScope;
    use fallio_core::types::{HoroscopeEntry, RequesterProfile};
    use fallio_storage::queries::users;
    use tempfile::tempdir;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn seed_daily(db: &Database, sign: &str, lang: &str) {
        horoscopes::upsert_entry(
            db,
            &HoroscopeEntry {
                sign: sign.into(),
                scope: HoroscopeScope::Daily,
                effective_date: "2026-02-01".into(),
                language: lang.into(),
                general: "a fine day".into(),
                love: "l".into(),
                money: "m".into(),
                health: "h".into(),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn completion_push_targets_latest_active_device() {
        let (db, _dir) = setup_db().await;
        users::upsert_user(&db, "u1", None, &RequesterProfile::default())
            .await
            .unwrap();
        devices::upsert_device(&db, "u1", "ExponentPushToken[abc]", true)
            .await
            .unwrap();

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/push/send"))
            .and(body_partial_json(serde_json::json!([
                {"to": "ExponentPushToken[abc]", "sound": "default"}
            ])))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let push = PushClient::new(&format!("{}/push/send", server.uri()), 100).unwrap();
        let sent = notify_fortune_completed(&db, &push, "u1", "f-1").await.unwrap();
        assert!(sent);

        // No device: nothing sent, not an error.
        users::upsert_user(&db, "u2", None, &RequesterProfile::default())
            .await
            .unwrap();
        let sent = notify_fortune_completed(&db, &push, "u2", "f-2").await.unwrap();
        assert!(!sent);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn daily_push_skips_signs_without_entries_and_chunks_sends() {
        let (db, _dir) = setup_db().await;

        for (user, sign) in [("u1", "aslan"), ("u2", "aslan"), ("u3", "balik")] {
            users::upsert_user(
                &db,
                user,
                Some("Ayse"),
                &RequesterProfile {
                    zodiac_sign: Some(sign.into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
            devices::upsert_device(&db, user, &format!("token-{user}"), true)
                .await
                .unwrap();
        }
        // Only aslan has a stored daily entry.
        seed_daily(&db, "aslan", "tr").await;

        let server = MockServer::start().await;
        // chunk_size 1 forces one request per message.
        Mock::given(method("POST"))
            .and(path("/push/send"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let push = PushClient::new(&format!("{}/push/send", server.uri()), 1).unwrap();
        let sent = daily_horoscope_push(&db, &push, "tr").await.unwrap();
        assert_eq!(sent, 2);

        db.close().await.unwrap();
    }

    #[test]
    fn greeting_localizes() {
        let (title, body) = daily_greeting("tr", Some("Ayse"), "Aslan");
        assert_eq!(title, "Günlük Burç Yorumun");
        assert!(body.contains("Günaydın Ayse"));

        let (title, body) = daily_greeting("en", None, "Leo");
        assert_eq!(title, "Daily Horoscope");
        assert!(body.contains("Leo"));
    }
}
