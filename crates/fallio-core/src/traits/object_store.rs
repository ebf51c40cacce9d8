// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object storage read trait for attached images.

use async_trait::async_trait;

use crate::error::FallioError;

/// Read-only access to the object storage bucket holding user-submitted
/// fortune images.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetches the raw bytes stored under a bucket-relative key.
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, FallioError>;
}
