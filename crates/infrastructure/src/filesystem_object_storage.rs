use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use brokerdesk_application::{Bucket, ObjectStorage, StoredObject};
use brokerdesk_core::{AppError, AppResult};

/// Public buckets stored as directories under one root and served by a
/// static file server at `public_base_url`.
#[derive(Debug, Clone)]
pub struct FilesystemObjectStorage {
    root: PathBuf,
    public_base_url: String,
}

impl FilesystemObjectStorage {
    /// Creates storage rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    fn object_path(&self, bucket: Bucket, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(AppError::Validation(format!(
                "object key '{key}' must be a relative path without '..'"
            )));
        }

        Ok(self.root.join(bucket.as_str()).join(relative))
    }

    fn public_url(&self, bucket: Bucket, key: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, bucket.as_str(), key)
    }
}

#[async_trait]
impl ObjectStorage for FilesystemObjectStorage {
    async fn put(&self, bucket: Bucket, key: &str, bytes: Vec<u8>) -> AppResult<StoredObject> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                AppError::Internal(format!(
                    "failed to create directory '{}': {error}",
                    parent.display()
                ))
            })?;
        }

        tokio::fs::write(&path, bytes).await.map_err(|error| {
            AppError::Internal(format!("failed to write '{}': {error}", path.display()))
        })?;

        tracing::info!(bucket = %bucket, key, "object stored");
        Ok(StoredObject {
            bucket,
            key: key.to_owned(),
            public_url: self.public_url(bucket, key),
        })
    }

    async fn remove(&self, bucket: Bucket, key: &str) -> AppResult<()> {
        let path = self.object_path(bucket, key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(AppError::Internal(format!(
                "failed to remove '{}': {error}",
                path.display()
            ))),
        }
    }
}
