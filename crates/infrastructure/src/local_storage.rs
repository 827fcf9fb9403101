//! Single JSON blob standing in for browser-local storage in demo mode.
//!
//! The blob maps collection names to JSON values. It is seeded with fixed
//! example records on first use and, when opened on a file, rewritten after
//! every change. Nothing here ever talks to the database.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use brokerdesk_core::{AppError, AppResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::demo_seed;

type Blob = BTreeMap<String, Value>;

/// Local JSON document store shared by the demo adapters.
#[derive(Debug)]
pub struct LocalStorage {
    path: Option<PathBuf>,
    blob: RwLock<Blob>,
}

impl LocalStorage {
    /// Creates a seeded store kept in memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            blob: RwLock::new(demo_seed::seed_blob()),
        }
    }

    /// Opens the blob stored at `path`, seeding and writing it when absent.
    pub async fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();

        let blob = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Blob>(&bytes).map_err(|error| {
                AppError::Internal(format!(
                    "local storage file '{}' is not valid JSON: {error}",
                    path.display()
                ))
            })?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "seeding local demo storage");
                let seeded = demo_seed::seed_blob();
                write_file(&path, &seeded).await?;
                seeded
            }
            Err(error) => {
                return Err(AppError::Internal(format!(
                    "failed to read local storage file '{}': {error}",
                    path.display()
                )));
            }
        };

        Ok(Self {
            path: Some(path),
            blob: RwLock::new(blob),
        })
    }

    /// Reads one collection, `None` when it was never written.
    pub async fn read<V: DeserializeOwned>(&self, key: &str) -> AppResult<Option<V>> {
        let blob = self.blob.read().await;
        blob.get(key).cloned().map(|value| decode(key, value)).transpose()
    }

    /// Applies an edit to one collection and persists the blob.
    ///
    /// The edit sees the default value when the collection is missing. When
    /// the edit or the file write fails, nothing is written.
    pub async fn update<V, R>(
        &self,
        key: &str,
        edit: impl FnOnce(&mut V) -> AppResult<R>,
    ) -> AppResult<R>
    where
        V: Serialize + DeserializeOwned + Default,
    {
        let mut blob = self.blob.write().await;
        let mut value: V = match blob.get(key) {
            Some(stored) => decode(key, stored.clone())?,
            None => V::default(),
        };

        let result = edit(&mut value)?;
        let encoded = serde_json::to_value(&value).map_err(|error| {
            AppError::Internal(format!("failed to encode local collection '{key}': {error}"))
        })?;

        if let Some(path) = &self.path {
            let mut staged = blob.clone();
            staged.insert(key.to_owned(), encoded.clone());
            write_file(path, &staged).await?;
        }
        blob.insert(key.to_owned(), encoded);
        debug!(key, "local storage updated");

        Ok(result)
    }

    /// Restores the seeded example records.
    pub async fn reset(&self) -> AppResult<()> {
        let mut blob = self.blob.write().await;
        *blob = demo_seed::seed_blob();
        if let Some(path) = &self.path {
            write_file(path, &blob).await?;
        }
        info!("local demo storage reset");
        Ok(())
    }
}

fn decode<V: DeserializeOwned>(key: &str, value: Value) -> AppResult<V> {
    serde_json::from_value(value).map_err(|error| {
        AppError::Internal(format!("local collection '{key}' is corrupt: {error}"))
    })
}

async fn write_file(path: &Path, blob: &Blob) -> AppResult<()> {
    let bytes = serde_json::to_vec_pretty(blob).map_err(|error| {
        AppError::Internal(format!("failed to encode local storage: {error}"))
    })?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to create local storage directory '{}': {error}",
                parent.display()
            ))
        })?;
    }

    tokio::fs::write(path, bytes).await.map_err(|error| {
        AppError::Internal(format!(
            "failed to write local storage file '{}': {error}",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use brokerdesk_core::AppError;

    use super::LocalStorage;

    #[tokio::test]
    async fn failed_edits_leave_the_blob_untouched() {
        let storage = LocalStorage::in_memory();

        let written = storage
            .update::<Vec<String>, _>("notes", |notes| {
                notes.push("primera".to_owned());
                Ok(())
            })
            .await;
        assert!(written.is_ok());

        let failed = storage
            .update::<Vec<String>, ()>("notes", |notes| {
                notes.clear();
                Err(AppError::Validation("rejected".to_owned()))
            })
            .await;
        assert!(failed.is_err());

        let notes: Option<Vec<String>> = storage.read("notes").await.unwrap_or_default();
        assert_eq!(notes, Some(vec!["primera".to_owned()]));
    }

    #[tokio::test]
    async fn file_backed_storage_survives_reopen() {
        let directory = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let path = directory.path().join("demo.json");

        let first = LocalStorage::open(&path).await;
        assert!(first.is_ok());
        let first = first.unwrap_or_else(|_| unreachable!());
        let written = first
            .update::<Vec<u32>, _>("counters", |counters| {
                counters.push(7);
                Ok(())
            })
            .await;
        assert!(written.is_ok());

        let reopened = LocalStorage::open(&path).await;
        assert!(reopened.is_ok());
        let counters: Option<Vec<u32>> = reopened
            .unwrap_or_else(|_| unreachable!())
            .read("counters")
            .await
            .unwrap_or_default();
        assert_eq!(counters, Some(vec![7]));
    }

    #[tokio::test]
    async fn failed_file_writes_leave_the_blob_untouched() {
        let directory = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let path = directory.path().join("demo.json");
        let storage = LocalStorage::open(&path)
            .await
            .unwrap_or_else(|_| unreachable!());

        assert!(tokio::fs::remove_file(&path).await.is_ok());
        assert!(tokio::fs::create_dir(&path).await.is_ok());

        let failed = storage
            .update::<Vec<String>, _>("notes", |notes| {
                notes.push("fantasma".to_owned());
                Ok(())
            })
            .await;
        assert!(matches!(failed, Err(AppError::Internal(_))));

        let notes: Option<Vec<String>> = storage.read("notes").await.unwrap_or_default();
        assert_eq!(notes, None);
    }

    #[tokio::test]
    async fn reset_restores_the_seed() {
        let storage = LocalStorage::in_memory();
        let _ = storage
            .update::<Vec<u32>, _>("counters", |counters| {
                counters.push(1);
                Ok(())
            })
            .await;

        assert!(storage.reset().await.is_ok());
        let counters: Option<Vec<u32>> = storage.read("counters").await.unwrap_or_default();
        assert_eq!(counters, None);
    }
}
