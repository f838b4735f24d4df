//! Physical file storage under the configured storage root

use std::path::{Path, PathBuf};

use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Result of persisting an upload to disk.
#[derive(Debug)]
pub struct StoredFile {
    pub id: Uuid,
    pub path: PathBuf,
    pub size: u64,
}

/// Owns the byte-level lifecycle of uploaded files. On-disk names are
/// derived from the generated identifier rather than the client-supplied
/// filename, so untrusted names never become path components.
#[derive(Clone)]
pub struct FileStore {
    storage_root: PathBuf,
}

impl FileStore {
    pub fn new(storage_root: PathBuf) -> Self {
        Self { storage_root }
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    /// Ensures the storage root exists. Idempotent; fails at startup if
    /// the path exists as a non-directory or cannot be created.
    pub async fn initialize(&self) -> Result<()> {
        if self.storage_root.exists() {
            if !self.storage_root.is_dir() {
                return Err(AppError::Storage(format!(
                    "storage root {} exists but is not a directory",
                    self.storage_root.display()
                )));
            }
            return Ok(());
        }

        async_fs::create_dir_all(&self.storage_root).await?;
        Ok(())
    }

    /// Writes the full content to `{storage_root}/{id}{extension}` and
    /// returns the measured byte count. On failure no file is registered
    /// by the caller.
    pub async fn persist(&self, data: &[u8], original_filename: &str) -> Result<StoredFile> {
        let id = Uuid::new_v4();

        let extension = Path::new(original_filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let stored_name = if extension.is_empty() {
            id.to_string()
        } else {
            format!("{}.{}", id, extension)
        };

        let path = self.storage_root.join(&stored_name);

        let mut file = async_fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;

        Ok(StoredFile {
            id,
            path,
            size: data.len() as u64,
        })
    }

    /// Best-effort removal. Absence or an I/O error is logged and
    /// reported as `false`; the caller's logical deletion proceeds
    /// regardless.
    pub async fn remove(&self, path: &Path) -> bool {
        match async_fs::remove_file(path).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to remove stored file {}: {}", path.display(), e);
                false
            }
        }
    }

    pub async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        async_fs::read(path).await.map_err(|e| {
            tracing::error!("Failed to read stored file {}: {}", path.display(), e);
            AppError::Storage(format!("failed to read {}", path.display()))
        })
    }
}
