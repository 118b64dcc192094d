//! Filesystem blob area holding uploaded model files.
//!
//! Files are written once under `<millis>-<original name>` and never
//! overwritten. Their lifetime is independent of the record store: a file
//! can disappear out of band, so existence is always checked at read time.

use std::io;
use std::path::{Path, PathBuf};

use bimlib_core::fields::{is_safe_stored_name, stored_file_name, stored_name_from_path};
use chrono::Utc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Upper bound on name probes when several uploads share a millisecond.
const MAX_NAME_ATTEMPTS: i64 = 1000;

/// Directory of stored model files.
#[derive(Debug, Clone)]
pub struct BlobStore {
    dir: PathBuf,
}

impl BlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the directory if needed. Returns true when it was created.
    pub async fn ensure_dir(&self) -> io::Result<bool> {
        if self.dir_exists().await {
            return Ok(false);
        }
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(true)
    }

    pub async fn dir_exists(&self) -> bool {
        tokio::fs::metadata(&self.dir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    /// Opens a new, empty file for `original_name` under a unique stored name.
    pub async fn create(&self, original_name: &str) -> io::Result<PendingBlob> {
        let base = Utc::now().timestamp_millis();

        for offset in 0..MAX_NAME_ATTEMPTS {
            let stored_name = stored_file_name(base + offset, original_name);
            let path = self.dir.join(&stored_name);

            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => {
                    return Ok(PendingBlob {
                        path,
                        stored_name,
                        original_name: original_name.to_string(),
                        file: Some(file),
                        written: 0,
                        committed: false,
                    })
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free stored name for '{}'", original_name),
        ))
    }

    /// Checks whether a stored file is present.
    pub async fn exists(&self, stored_name: &str) -> bool {
        match self.resolve(stored_name) {
            Some(path) => tokio::fs::metadata(path)
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false),
            None => false,
        }
    }

    /// Checks the file behind a record's `filePath`.
    pub async fn exists_for_path(&self, file_path: &str) -> bool {
        match stored_name_from_path(file_path) {
            Some(name) => self.exists(name).await,
            None => false,
        }
    }

    /// Opens a stored file for reading, returning it with its length.
    /// `Ok(None)` means the file is not there.
    pub async fn open(&self, stored_name: &str) -> io::Result<Option<(File, u64)>> {
        let Some(path) = self.resolve(stored_name) else {
            return Ok(None);
        };

        match File::open(&path).await {
            Ok(file) => {
                let meta = file.metadata().await?;
                if !meta.is_file() {
                    return Ok(None);
                }
                Ok(Some((file, meta.len())))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn resolve(&self, stored_name: &str) -> Option<PathBuf> {
        is_safe_stored_name(stored_name).then(|| self.dir.join(stored_name))
    }
}

/// A file being written to the blob area.
///
/// Until [`PendingBlob::commit`] is called the file is removed when the value
/// is dropped, so a failed upload never leaves a partial or orphaned file.
#[derive(Debug)]
pub struct PendingBlob {
    path: PathBuf,
    stored_name: String,
    original_name: String,
    file: Option<File>,
    written: u64,
    committed: bool,
}

impl PendingBlob {
    pub fn stored_name(&self) -> &str {
        &self.stored_name
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Bytes written so far.
    pub fn size(&self) -> u64 {
        self.written
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        let file = self.file.as_mut().ok_or_else(closed)?;
        file.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flushes the file to disk. The blob stays removable until committed.
    pub async fn finish(&mut self) -> io::Result<()> {
        let mut file = self.file.take().ok_or_else(closed)?;
        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }

    /// Keeps the file permanently and returns its stored name.
    pub fn commit(mut self) -> String {
        self.committed = true;
        std::mem::take(&mut self.stored_name)
    }
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "blob already finished")
}

impl Drop for PendingBlob {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        drop(self.file.take());
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::warn!(file = %self.path.display(), "Removed uncommitted upload"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::error!(file = %self.path.display(), error = %e, "Failed to remove uncommitted upload")
            }
        }
    }
}
