//! Filesystem-backed [`KeyValueStore`].

use std::fs::OpenOptions;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use tracing::debug;

use super::{KeyLock, KeyValueStore, StorageError};

/// Stores each key as one file inside a data directory.
///
/// Keys are percent-encoded into file names, so any key maps to a single
/// flat file. Each write goes to a fresh temp file in the same directory that
/// is then renamed over the target; readers see either the old or the new
/// value, never a partial one.
///
/// [`lock`](KeyValueStore::lock) takes an `flock` on a `<key>.lock` sibling,
/// which serializes writers across processes sharing the directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StorageError::Io {
                key: dir.display().to_string(),
                source,
            })?;
        Ok(Self { dir })
    }

    /// The data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str, extension: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{extension}", urlencoding::encode(key)))
    }
}

fn io_error(key: &str, source: io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source,
    }
}

/// Run blocking filesystem work off the async runtime.
async fn blocking<T, F>(key: &str, work: F) -> Result<T, StorageError>
where
    T: Send + 'static,
    F: FnOnce() -> io::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(io::Error::other)
        .and_then(|result| result)
        .map_err(|e| io_error(key, e))
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_for(key, "json")).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let dir = self.dir.clone();
        let path = self.path_for(key, "json");
        let bytes = value.as_bytes().to_vec();
        let len = bytes.len();

        let target = path.clone();
        blocking(key, move || {
            let mut tmp = tempfile::Builder::new()
                .prefix(".cart-")
                .suffix(".tmp")
                .tempfile_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await?;

        debug!(path = %path.display(), bytes = len, "stored value");
        Ok(())
    }

    async fn lock(&self, key: &str) -> Result<KeyLock, StorageError> {
        let path = self.path_for(key, "lock");
        let file = blocking(key, move || {
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&path)?;
            FileExt::lock_exclusive(&file)?;
            Ok(file)
        })
        .await?;
        Ok(KeyLock::file(file))
    }
}
