// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment pipeline: resolve stored image URLs to bucket keys, fetch
//! bytes in parallel, and base64-encode provider-neutral image parts.
//!
//! Partial image context beats aborting generation: a failed individual
//! download is logged and dropped, never an error for the batch. Output
//! order follows completion order; downstream only consumes the count.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use fallio_core::{FallioError, ImagePart, ObjectStore};
use futures::future::join_all;
use tracing::{debug, warn};

/// MIME type recorded for fetched images. The mobile client uploads JPEG.
const IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Reads objects over the storage service's public HTTP endpoint.
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
}

impl HttpObjectStore {
    /// Creates a reader for one bucket under the given base URL.
    pub fn new(base_url: &str, bucket: &str) -> Result<Self, FallioError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FallioError::Http {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
        })
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, FallioError> {
        let url = format!("{}/{}/{}", self.base_url, self.bucket, key);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FallioError::Http {
                message: format!("object fetch failed for {key}: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FallioError::Http {
                message: format!("object fetch for {key} returned {status}"),
                source: None,
            });
        }

        let bytes = response.bytes().await.map_err(|e| FallioError::Http {
            message: format!("object body read failed for {key}: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(bytes.to_vec())
    }
}

/// Extracts the bucket-relative key from a stored public URL.
///
/// Stored URLs look like `.../object/public/<bucket>/<folder>/<file>`;
/// the key is everything after the bucket marker.
pub fn bucket_key(url: &str, bucket: &str) -> Option<String> {
    let marker = format!("/{bucket}/");
    url.split_once(&marker).map(|(_, key)| key.to_string())
}

/// Downloads every referenced image concurrently and encodes the
/// successes into provider-neutral parts.
pub async fn fetch_image_parts(
    store: &dyn ObjectStore,
    urls: &[String],
    bucket: &str,
) -> Vec<ImagePart> {
    let keys: Vec<String> = urls
        .iter()
        .filter_map(|url| {
            let key = bucket_key(url, bucket);
            if key.is_none() {
                warn!(url, bucket, "image URL does not contain the bucket marker, skipping");
            }
            key
        })
        .collect();

    let downloads = keys.iter().map(|key| async move {
        match store.fetch(key).await {
            Ok(bytes) => {
                debug!(key, size = bytes.len(), "image downloaded");
                Some(ImagePart {
                    media_type: IMAGE_MIME_TYPE.to_string(),
                    data: BASE64.encode(&bytes),
                })
            }
            Err(e) => {
                warn!(key, error = %e, "image download failed, dropping attachment");
                None
            }
        }
    });

    join_all(downloads).await.into_iter().flatten().collect()
}
