//! Session carrier persisted as a JSON object on disk.
//!
//! Lets a command-line front end run "begin" and "complete" as two separate processes.

use std::collections::BTreeMap;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::SessionCarrier;
use crate::error::{Error, ErrorKind};

pub struct FileSession {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileSession {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<BTreeMap<String, String>, Error> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::Session,
            }),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(io_error(e)),
        }
    }

    /// Replaces the file through a sibling temp file and a rename, so a crash leaves
    /// either the old contents or the new ones. The file is owner-only on Unix.
    async fn write(&self, values: &BTreeMap<String, String>) -> Result<(), Error> {
        let bytes = serde_json::to_vec_pretty(values)?;
        let staging = self.staging_path();

        // A leftover from an interrupted write may carry looser permissions.
        match tokio::fs::remove_file(&staging).await {
            Err(e) if e.kind() != IoErrorKind::NotFound => return Err(io_error(e)),
            _ => {}
        }

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&staging).await.map_err(io_error)?;
        file.write_all(&bytes).await.map_err(io_error)?;
        file.sync_all().await.map_err(io_error)?;
        drop(file);

        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(io_error)
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn io_error(err: std::io::Error) -> Error {
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::Session,
    }
}

#[async_trait]
impl SessionCarrier for FileSession {
    async fn set(&self, key: &str, value: String) -> Result<(), Error> {
        let _guard = self.lock.lock().await;
        let mut values = self.read().await?;
        values.insert(key.to_string(), value);
        self.write(&values).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.remove(key))
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        let _guard = self.lock.lock().await;
        let mut values = self.read().await?;
        if values.remove(key).is_some() {
            self.write(&values).await?;
        }
        Ok(())
    }
}
