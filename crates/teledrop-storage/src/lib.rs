//! # teledrop-storage
//!
//! The Blob Store (§4.1): content-addressed storage for a drop's single
//! file, behind a pluggable [`StorageBackend`] trait. Ships with a
//! filesystem backend by default; an S3-compatible backend is available
//! behind the `s3` feature.

pub mod backend;
pub mod error;
pub mod filesystem;
pub mod key;

#[cfg(feature = "s3")]
pub mod s3;

pub use backend::{BlobStat, BlobStream, BlobWriter, ByteRange, StorageBackend};
pub use error::{StorageError, StorageResult};
pub use filesystem::FilesystemBackend;
pub use key::derive_storage_key;

#[cfg(feature = "s3")]
pub use s3::S3Backend;
