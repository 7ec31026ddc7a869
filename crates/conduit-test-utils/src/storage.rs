// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory storage with failure injection.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;

use conduit_core::{ConduitError, Storage, StoredObject};

/// Base URL of every object stored in a [`MemoryStorage`].
pub const MEMORY_BASE_URL: &str = "https://storage.test";

#[derive(Default)]
struct State {
    objects: HashMap<String, StoredObject>,
    fail_matching: Vec<String>,
    unreachable: bool,
}

/// A [`Storage`] backed by a map.
///
/// Puts to a path containing any registered failure pattern fail
/// individually; marking the store unreachable fails every call.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<State>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make puts to paths containing `pattern` fail.
    pub async fn fail_paths_containing(&self, pattern: &str) {
        self.state.lock().await.fail_matching.push(pattern.to_string());
    }

    pub async fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().await.unreachable = unreachable;
    }

    /// Paths stored so far, sorted.
    pub async fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.state.lock().await.objects.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub async fn object(&self, path: &str) -> Option<StoredObject> {
        self.state.lock().await.objects.get(path).cloned()
    }
}

fn unreachable_error() -> ConduitError {
    ConduitError::storage(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "memory storage marked unreachable",
    ))
}

#[async_trait]
impl Storage for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn test(&self) -> Result<(), ConduitError> {
        if self.state.lock().await.unreachable {
            return Err(unreachable_error());
        }
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<StoredObject, ConduitError> {
        let state = self.state.lock().await;
        if state.unreachable {
            return Err(unreachable_error());
        }
        state
            .objects
            .get(path)
            .cloned()
            .ok_or_else(|| ConduitError::StorageNotFound {
                path: path.to_string(),
            })
    }

    async fn put(&self, path: &str, content_type: &str, body: Bytes) -> Result<String, ConduitError> {
        let mut state = self.state.lock().await;
        if state.unreachable {
            return Err(unreachable_error());
        }
        if state.fail_matching.iter().any(|p| path.contains(p.as_str())) {
            return Err(ConduitError::storage(std::io::Error::other(format!(
                "injected failure for {path}"
            ))));
        }
        state.objects.insert(
            path.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                body,
            },
        );
        Ok(format!("{MEMORY_BASE_URL}/{path}"))
    }

    async fn batch_put(&self, uploads: &mut [conduit_core::Upload]) -> Result<(), ConduitError> {
        if self.state.lock().await.unreachable {
            return Err(unreachable_error());
        }
        conduit_core::traits::storage::put_concurrently(self, uploads).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_core::Upload;

    #[tokio::test]
    async fn injected_failures_are_per_slot() {
        let storage = MemoryStorage::new();
        storage.fail_paths_containing("broken").await;

        let mut uploads = vec![
            Upload::new("ok.txt", "text/plain", Bytes::from_static(b"1")),
            Upload::new("broken.txt", "text/plain", Bytes::from_static(b"2")),
        ];
        storage.batch_put(&mut uploads).await.unwrap();

        assert_eq!(uploads[0].url.as_deref(), Some("https://storage.test/ok.txt"));
        assert!(uploads[1].error.is_some());
        assert_eq!(storage.paths().await, vec!["ok.txt".to_string()]);
    }

    #[tokio::test]
    async fn unreachable_fails_whole_batch() {
        let storage = MemoryStorage::new();
        storage.set_unreachable(true).await;

        let mut uploads = vec![Upload::new("a.txt", "text/plain", Bytes::new())];
        assert!(storage.batch_put(&mut uploads).await.is_err());
        assert!(storage.test().await.is_err());
        assert!(uploads[0].url.is_none());
    }
}
