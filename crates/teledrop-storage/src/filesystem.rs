//! Filesystem-backed [`StorageBackend`] (§4.1).
//!
//! Writes stage into a `.tmp` sibling of the final path and are published
//! with `fsync` + `rename`, so a crash mid-write never leaves a partial
//! blob visible under its real key (§5's durability requirement). A
//! startup sweep reclaims `.tmp` files orphaned by a writer that was never
//! committed.

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use crate::backend::{BlobStat, BlobStream, BlobWriter, ByteRange, StorageBackend};
use crate::error::{StorageError, StorageResult};

pub struct FilesystemBackend {
    base_path: PathBuf,
    chunk_size: usize,
}

impl FilesystemBackend {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            chunk_size: teledrop_core::defaults::CHUNK_SIZE_BYTES,
        }
    }

    /// Override the read-side chunk size (§10.2's `TELEDROP_CHUNK_SIZE_BYTES`);
    /// the default matches [`teledrop_core::defaults::CHUNK_SIZE_BYTES`].
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn full_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{key}.tmp"))
    }

    /// Round-trip write/read/delete check performed once at startup.
    pub async fn validate(&self) -> Result<(), String> {
        let test_dir = self.base_path.join(".health-check");
        let test_file = test_dir.join("probe.bin");

        fs::create_dir_all(&test_dir)
            .await
            .map_err(|e| format!("create_dir_all({:?}): {}", test_dir, e))?;

        let data = b"teledrop-storage-health-check";
        fs::write(&test_file, data)
            .await
            .map_err(|e| format!("write({:?}): {}", test_file, e))?;

        let read_back = fs::read(&test_file)
            .await
            .map_err(|e| format!("read({:?}): {}", test_file, e))?;
        if read_back != data {
            return Err("read-back mismatch".to_string());
        }

        fs::remove_file(&test_file)
            .await
            .map_err(|e| format!("remove_file({:?}): {}", test_file, e))?;
        let _ = fs::remove_dir(&test_dir).await;

        Ok(())
    }

    /// Remove `.tmp` files older than `max_age_hours`, orphaned by a writer
    /// that crashed or panicked before `commit` (§4.1). Returns the count
    /// removed.
    pub async fn sweep_stale(&self, max_age_hours: i64) -> StorageResult<u64> {
        let cutoff = std::time::SystemTime::now()
            - std::time::Duration::from_secs(max_age_hours.max(0) as u64 * 3600);
        let mut swept = 0u64;
        let mut stack = vec![self.base_path.clone()];

        while let Some(dir) = stack.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(_) => continue,
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let Ok(file_type) = entry.file_type().await else {
                    continue;
                };
                if file_type.is_dir() {
                    stack.push(path);
                    continue;
                }
                if path.extension().and_then(|e| e.to_str()) != Some("tmp") {
                    continue;
                }
                let Ok(modified) = entry.metadata().await.and_then(|m| m.modified()) else {
                    continue;
                };
                if modified < cutoff && fs::remove_file(&path).await.is_ok() {
                    swept += 1;
                    debug!(path = %path.display(), "storage: swept stale temp file");
                }
            }
        }

        Ok(swept)
    }

    fn not_found_or_io(key: &str, err: std::io::Error) -> StorageError {
        if err.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(key.to_string())
        } else {
            StorageError::Io(err)
        }
    }
}

pub struct FsWriter {
    temp_path: PathBuf,
    final_path: PathBuf,
    file: fs::File,
}

#[async_trait]
impl BlobWriter for FsWriter {
    async fn write_chunk(&mut self, chunk: Bytes) -> StorageResult<()> {
        self.file.write_all(&chunk).await?;
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> StorageResult<()> {
        self.file.sync_all().await?;
        drop(self.file);

        fs::rename(&self.temp_path, &self.final_path)
            .await
            .map_err(|e| {
                warn!(
                    from = %self.temp_path.display(),
                    to = %self.final_path.display(),
                    error = %e,
                    "storage: rename failed"
                );
                e
            })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.final_path, std::fs::Permissions::from_mode(0o644)).await?;
        }

        Ok(())
    }

    async fn abort(self: Box<Self>) -> StorageResult<()> {
        drop(self.file);
        let _ = fs::remove_file(&self.temp_path).await;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn open_write(&self, key: &str) -> StorageResult<Box<dyn BlobWriter>> {
        let final_path = self.full_path(key);
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let temp_path = self.temp_path(key);
        let file = fs::File::create(&temp_path).await?;
        Ok(Box::new(FsWriter {
            temp_path,
            final_path,
            file,
        }))
    }

    async fn read(&self, key: &str) -> StorageResult<BlobStream> {
        let full_path = self.full_path(key);
        let file = fs::File::open(&full_path)
            .await
            .map_err(|e| Self::not_found_or_io(key, e))?;
        let stream = ReaderStream::with_capacity(file, self.chunk_size).map_err(StorageError::from);
        Ok(Box::pin(stream))
    }

    async fn read_range(&self, key: &str, range: ByteRange) -> StorageResult<BlobStream> {
        let full_path = self.full_path(key);
        let mut file = fs::File::open(&full_path)
            .await
            .map_err(|e| Self::not_found_or_io(key, e))?;
        file.seek(std::io::SeekFrom::Start(range.start)).await?;
        let limited = file.take(range.len());
        let stream = ReaderStream::with_capacity(limited, self.chunk_size).map_err(StorageError::from);
        Ok(Box::pin(stream))
    }

    async fn stat(&self, key: &str) -> StorageResult<BlobStat> {
        let full_path = self.full_path(key);
        let metadata = fs::metadata(&full_path)
            .await
            .map_err(|e| Self::not_found_or_io(key, e))?;
        Ok(BlobStat {
            size: metadata.len(),
        })
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let full_path = self.full_path(key);
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn move_blob(&self, from: &str, to: &str) -> StorageResult<()> {
        let from_path = self.full_path(from);
        let to_path = self.full_path(to);
        if let Some(parent) = to_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::rename(&from_path, &to_path)
            .await
            .map_err(|e| Self::not_found_or_io(from, e))?;
        Ok(())
    }
}
