//! The Blob Store's pluggable backend contract (§4.1).

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::StorageResult;

/// An inclusive byte range, as parsed from an HTTP `Range` header (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end_inclusive: u64,
}

impl ByteRange {
    pub fn len(&self) -> u64 {
        self.end_inclusive - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Metadata about a stored blob, independent of the database's `files` row.
#[derive(Debug, Clone, Copy)]
pub struct BlobStat {
    pub size: u64,
}

/// A stream of content chunks read back from a backend.
pub type BlobStream = BoxStream<'static, StorageResult<Bytes>>;

/// An in-progress write to a backend.
///
/// Every chunk passed to `write_chunk` lands in backend-local staging;
/// nothing is visible under the final key until `commit` succeeds. Dropping
/// a `BlobWriter` without calling `commit` must leave no publicly-visible
/// blob behind — backends achieve this with a temp file (filesystem) or a
/// local spill file that is never uploaded (S3).
#[async_trait]
pub trait BlobWriter: Send {
    async fn write_chunk(&mut self, chunk: Bytes) -> StorageResult<()>;

    /// Atomically publish the staged content under the key passed to
    /// `open_write`. Commit is fallible: a rename can fail, an upload can be
    /// rejected, so this cannot be a `Drop` impl.
    async fn commit(self: Box<Self>) -> StorageResult<()>;

    /// Discard the staged content without publishing it.
    async fn abort(self: Box<Self>) -> StorageResult<()>;
}

/// The Blob Store's storage backend abstraction (§4.1).
///
/// Implementations: [`crate::filesystem::FilesystemBackend`] and, behind the
/// `s3` feature, [`crate::s3::S3Backend`].
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Begin a streaming write under `key`. The blob is not visible to
    /// `read`/`stat` until the returned writer's `commit` completes.
    async fn open_write(&self, key: &str) -> StorageResult<Box<dyn BlobWriter>>;

    /// Stream the full content stored under `key`.
    async fn read(&self, key: &str) -> StorageResult<BlobStream>;

    /// Stream the bytes of `key` within `range`, inclusive on both ends.
    async fn read_range(&self, key: &str, range: ByteRange) -> StorageResult<BlobStream>;

    /// Look up size metadata for the blob at `key` without reading it.
    async fn stat(&self, key: &str) -> StorageResult<BlobStat>;

    /// Remove the blob at `key`. Idempotent: deleting an absent key is not
    /// an error (§4.4's delete-drop operation may race a prior partial
    /// cleanup).
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Move a blob from `from` to `to`, replacing a content upload (§4.4).
    /// Used when replacing a drop's file: the new content lands at a fresh
    /// key first, then this call retires the old key.
    async fn move_blob(&self, from: &str, to: &str) -> StorageResult<()>;
}
