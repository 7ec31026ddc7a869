// SPDX-FileCopyrightText: 2026 Conduit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local filesystem implementation of the Storage trait.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use conduit_core::{ConduitError, Storage, StoredObject};

const CHECK_PREFIX: &str = ".conduit-check-";
const CONTENT_TYPE_SUFFIX: &str = ".content-type";

/// Stores objects as files under a root directory, served from `base_url`.
///
/// The content type given to `put` is kept in a `<file>.content-type`
/// sidecar; objects without one fall back to their extension.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
    base_url: String,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` under the root, rejecting anything that could escape it.
    fn resolve(&self, path: &str) -> Result<PathBuf, ConduitError> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(ConduitError::storage(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid storage path `{path}`"),
            )));
        }
        Ok(self.root.join(relative))
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Storage for FsStorage {
    fn name(&self) -> &str {
        "disk"
    }

    async fn test(&self) -> Result<(), ConduitError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(ConduitError::storage)?;

        let check = self
            .root
            .join(format!("{CHECK_PREFIX}{}", uuid::Uuid::new_v4()));
        tokio::fs::write(&check, b"ok")
            .await
            .map_err(ConduitError::storage)?;
        tokio::fs::remove_file(&check)
            .await
            .map_err(ConduitError::storage)?;
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<StoredObject, ConduitError> {
        let full = self.resolve(path)?;
        let body = match tokio::fs::read(&full).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConduitError::StorageNotFound {
                    path: path.to_string(),
                });
            }
            Err(e) => return Err(ConduitError::storage(e)),
        };
        Ok(StoredObject {
            content_type: read_content_type(&full, path).await?,
            body: Bytes::from(body),
        })
    }

    async fn put(&self, path: &str, content_type: &str, body: Bytes) -> Result<String, ConduitError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(ConduitError::storage)?;
        }
        tokio::fs::write(&full, &body)
            .await
            .map_err(ConduitError::storage)?;
        tokio::fs::write(sidecar_for(&full), content_type)
            .await
            .map_err(ConduitError::storage)?;

        debug!(path, content_type, bytes = body.len(), "stored object");
        Ok(self.url_for(path))
    }
}

async fn read_content_type(full: &Path, path: &str) -> Result<String, ConduitError> {
    match tokio::fs::read_to_string(sidecar_for(full)).await {
        Ok(stored) if !stored.trim().is_empty() => Ok(stored.trim().to_string()),
        Ok(_) => Ok(content_type_for(path).to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Ok(content_type_for(path).to_string())
        }
        Err(e) => Err(ConduitError::storage(e)),
    }
}

fn sidecar_for(full: &Path) -> PathBuf {
    let mut name = full.as_os_str().to_os_string();
    name.push(CONTENT_TYPE_SUFFIX);
    PathBuf::from(name)
}

/// Content type for a stored file, from its extension.
pub fn content_type_for(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "mp4" => "video/mp4",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_core::Upload;

    fn storage() -> (tempfile::TempDir, FsStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path(), "https://media.example.com/");
        (dir, storage)
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let (_dir, storage) = storage();
        let url = storage
            .put("attachments/ch/1.jpg", "image/jpeg", Bytes::from_static(b"\xff\xd8"))
            .await
            .unwrap();
        assert_eq!(url, "https://media.example.com/attachments/ch/1.jpg");

        let obj = storage.get("attachments/ch/1.jpg").await.unwrap();
        assert_eq!(obj.content_type, "image/jpeg");
        assert_eq!(obj.body, Bytes::from_static(b"\xff\xd8"));
    }

    #[tokio::test]
    async fn put_content_type_survives_unknown_extension() {
        let (_dir, storage) = storage();
        storage
            .put("attachments/ch/0.bin", "image/heic", Bytes::from_static(b"heic"))
            .await
            .unwrap();

        let obj = storage.get("attachments/ch/0.bin").await.unwrap();
        assert_eq!(obj.content_type, "image/heic");
        assert_eq!(obj.body, Bytes::from_static(b"heic"));
    }

    #[tokio::test]
    async fn file_without_sidecar_uses_extension() {
        let (dir, storage) = storage();
        std::fs::write(dir.path().join("legacy.png"), b"png").unwrap();

        let obj = storage.get("legacy.png").await.unwrap();
        assert_eq!(obj.content_type, "image/png");
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let (_dir, storage) = storage();
        assert!(matches!(
            storage.get("nope.txt").await,
            Err(ConduitError::StorageNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let (_dir, storage) = storage();
        for bad in ["../escape.txt", "a/../../b.txt", "/etc/passwd", ""] {
            assert!(
                storage.put(bad, "text/plain", Bytes::new()).await.is_err(),
                "{bad} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn batch_put_marks_bad_slots_only() {
        let (_dir, storage) = storage();
        let mut uploads = vec![
            Upload::new("a.txt", "text/plain", Bytes::from_static(b"a")),
            Upload::new("../b.txt", "text/plain", Bytes::from_static(b"b")),
            Upload::new("c/d.png", "image/png", Bytes::from_static(b"d")),
        ];
        storage.batch_put(&mut uploads).await.unwrap();

        assert_eq!(uploads[0].url.as_deref(), Some("https://media.example.com/a.txt"));
        assert!(uploads[1].error.is_some() && uploads[1].url.is_none());
        assert_eq!(uploads[2].url.as_deref(), Some("https://media.example.com/c/d.png"));
    }

    #[tokio::test]
    async fn test_creates_root_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested/media");
        let storage = FsStorage::new(&root, "http://localhost/media");
        storage.test().await.unwrap();

        assert!(root.is_dir());
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn content_types_from_extension() {
        assert_eq!(content_type_for("x/y.JPG"), "image/jpeg");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
