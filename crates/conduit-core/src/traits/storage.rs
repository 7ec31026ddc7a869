// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage trait for attachment payload backends (disk, object stores).

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ConduitError;

/// ACL applied to uploads unless the caller asks otherwise.
pub const DEFAULT_ACL: &str = "public-read";

/// A stored payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub body: Bytes,
}

/// One slot of a [`Storage::batch_put`] call.
///
/// After the batch returns, exactly one of `url` or `error` is set.
#[derive(Debug)]
pub struct Upload {
    pub path: String,
    pub body: Bytes,
    pub content_type: String,
    pub acl: String,
    pub url: Option<String>,
    pub error: Option<ConduitError>,
}

impl Upload {
    pub fn new(path: impl Into<String>, content_type: impl Into<String>, body: Bytes) -> Self {
        Self {
            path: path.into(),
            body,
            content_type: content_type.into(),
            acl: DEFAULT_ACL.to_string(),
            url: None,
            error: None,
        }
    }

    pub fn with_acl(mut self, acl: impl Into<String>) -> Self {
        self.acl = acl.into();
        self
    }

    pub fn is_ok(&self) -> bool {
        self.url.is_some() && self.error.is_none()
    }
}

/// A backend for attachment-like byte payloads.
///
/// Implementations are shared across concurrent requests.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Short backend name, e.g. `disk`.
    fn name(&self) -> &str;

    /// Check the backend is reachable and its credentials work.
    async fn test(&self) -> Result<(), ConduitError>;

    /// Fetch the object at `path`.
    async fn get(&self, path: &str) -> Result<StoredObject, ConduitError>;

    /// Store `body` at `path`, returning the URL it can be fetched from.
    async fn put(&self, path: &str, content_type: &str, body: Bytes) -> Result<String, ConduitError>;

    /// Store every upload, recording a URL or an error on each slot.
    ///
    /// A failing item never affects its siblings. `Err` is reserved for
    /// conditions that sink the whole batch.
    async fn batch_put(&self, uploads: &mut [Upload]) -> Result<(), ConduitError> {
        put_concurrently(self, uploads).await;
        Ok(())
    }
}

/// Run `put` for every upload concurrently and fill in each slot.
pub async fn put_concurrently<S: Storage + ?Sized>(storage: &S, uploads: &mut [Upload]) {
    let results = futures::future::join_all(
        uploads
            .iter()
            .map(|u| storage.put(&u.path, &u.content_type, u.body.clone())),
    )
    .await;

    for (upload, result) in uploads.iter_mut().zip(results) {
        match result {
            Ok(url) => upload.url = Some(url),
            Err(e) => {
                tracing::warn!(path = %upload.path, error = %e, "upload failed");
                upload.error = Some(e);
            }
        }
    }
}
