//! File-backed store: one JSON file per room under a data directory.

use std::path::PathBuf;

use tokio::fs;

use crate::{SnapshotStore, StoreError};

/// A [`SnapshotStore`] that keeps each key in `<dir>/<key>.json`.
///
/// Writes go to a `.tmp` sibling first and are renamed into place, so a
/// crash mid-write leaves the previous snapshot intact rather than a
/// truncated file. Keys are validated room names (`[A-Za-z0-9_-]`),
/// which is what makes embedding them in file names safe.
#[derive(Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|source| StoreError::WriteFailed {
                key: dir.display().to_string(),
                source,
            })?;
        tracing::info!(dir = %dir.display(), "file store ready");
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SnapshotStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::ReadFailed {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        let write = async {
            fs::write(&tmp, value).await?;
            fs::rename(&tmp, &path).await
        };
        write.await.map_err(|source| StoreError::WriteFailed {
            key: key.to_string(),
            source,
        })
    }
}
