//! S3-compatible [`StorageBackend`] (§4.1), gated behind the `s3` feature.
//!
//! S3 has no rename primitive, so atomicity is achieved differently than on
//! the filesystem: a write spools into a local temp file, and only
//! `commit()` issues the `PutObject` call. A reader never observes a
//! partial object because nothing is uploaded until the spool is complete.
//! `move_blob` is a `CopyObject` followed by a `DeleteObject` of the source.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use futures::TryStreamExt;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::backend::{BlobStat, BlobStream, BlobWriter, ByteRange, StorageBackend};
use crate::error::{StorageError, StorageResult};

pub struct S3Backend {
    client: Client,
    bucket: String,
    spool_dir: PathBuf,
}

impl S3Backend {
    pub fn new(client: Client, bucket: impl Into<String>, spool_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            spool_dir: spool_dir.into(),
        }
    }

    fn is_not_found<E: std::fmt::Debug>(err: &aws_sdk_s3::error::SdkError<E>) -> bool {
        format!("{:?}", err).contains("NotFound") || format!("{:?}", err).contains("NoSuchKey")
    }
}

pub struct S3Writer {
    client: Client,
    bucket: String,
    key: String,
    spool_path: PathBuf,
    file: fs::File,
}

#[async_trait]
impl BlobWriter for S3Writer {
    async fn write_chunk(&mut self, chunk: Bytes) -> StorageResult<()> {
        self.file.write_all(&chunk).await?;
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> StorageResult<()> {
        self.file.sync_all().await?;
        drop(self.file);

        let body = ByteStream::from_path(&self.spool_path)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let _ = fs::remove_file(&self.spool_path).await;
        Ok(())
    }

    async fn abort(self: Box<Self>) -> StorageResult<()> {
        drop(self.file);
        let _ = fs::remove_file(&self.spool_path).await;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    async fn open_write(&self, key: &str) -> StorageResult<Box<dyn BlobWriter>> {
        fs::create_dir_all(&self.spool_dir).await?;
        let spool_path = self.spool_dir.join(format!("{}.spool", uuid::Uuid::now_v7()));
        let file = fs::File::create(&spool_path).await?;
        Ok(Box::new(S3Writer {
            client: self.client.clone(),
            bucket: self.bucket.clone(),
            key: key.to_string(),
            spool_path,
            file,
        }))
    }

    async fn read(&self, key: &str) -> StorageResult<BlobStream> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if Self::is_not_found(&e) {
                    StorageError::NotFound(key.to_string())
                } else {
                    StorageError::Backend(e.to_string())
                }
            })?;

        let stream = output.body.map_err(|e| StorageError::Backend(e.to_string()));
        Ok(Box::pin(stream))
    }

    async fn read_range(&self, key: &str, range: ByteRange) -> StorageResult<BlobStream> {
        let header = format!("bytes={}-{}", range.start, range.end_inclusive);
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .range(header)
            .send()
            .await
            .map_err(|e| {
                if Self::is_not_found(&e) {
                    StorageError::NotFound(key.to_string())
                } else {
                    StorageError::Backend(e.to_string())
                }
            })?;

        let stream = output.body.map_err(|e| StorageError::Backend(e.to_string()));
        Ok(Box::pin(stream))
    }

    async fn stat(&self, key: &str) -> StorageResult<BlobStat> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if Self::is_not_found(&e) {
                    StorageError::NotFound(key.to_string())
                } else {
                    StorageError::Backend(e.to_string())
                }
            })?;

        Ok(BlobStat {
            size: output.content_length().unwrap_or(0).max(0) as u64,
        })
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn move_blob(&self, from: &str, to: &str) -> StorageResult<()> {
        let source = format!("{}/{}", self.bucket, from);
        self.client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(&source)
            .key(to)
            .send()
            .await
            .map_err(|e| {
                if Self::is_not_found(&e) {
                    StorageError::NotFound(from.to_string())
                } else {
                    StorageError::Backend(e.to_string())
                }
            })?;

        self.delete(from).await
    }
}
