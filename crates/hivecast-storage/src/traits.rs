//! Storage abstraction traits
//!
//! This module defines the driver and session traits that every storage backend
//! implements, together with the values that cross that boundary.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use hivecast_core::StorageType;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Failed to read input data: {0}")]
    ReadFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Operation not supported by this backend: {0}")]
    NotSupported(&'static str),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Input handed to [`ObjectSession::save_data`].
pub type DataReader = Pin<Box<dyn AsyncRead + Send + Unpin>>;

/// Body returned by [`ObjectSession::read_data`].
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Caller-supplied properties for a saved object.
///
/// Backends that cannot store them ignore them.
#[derive(Debug, Clone, Default)]
pub struct FileProperties {
    pub metadata: HashMap<String, String>,
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
}

/// Result of a successful save: the durable identifier of the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveDataOutput {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub size: Option<u64>,
    pub etag: Option<String>,
}

/// A file description paired with its content stream.
pub struct FileInfoReader {
    pub file_info: FileInfo,
    pub body: ByteStream,
}

impl Debug for FileInfoReader {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FileInfoReader")
            .field("file_info", &self.file_info)
            .finish_non_exhaustive()
    }
}

/// One page of a directory listing.
#[derive(Debug, Clone, Default)]
pub struct PageInfo {
    pub files: Vec<FileInfo>,
    pub directories: Vec<String>,
    pub next_token: Option<String>,
}

/// Backend identity reported by a session for diagnostics and serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OsInfo {
    pub storage_type: StorageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swarm_info: Option<SwarmOsInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwarmOsInfo {
    pub host: String,
    pub video_stamp: String,
    pub feed_stamp: String,
}

/// A process-wide descriptor of one storage endpoint.
///
/// Drivers are built once at startup and mint one session per logical output path.
#[async_trait]
pub trait ObjectStoreDriver: Send + Sync {
    /// URI schemes this driver answers to, used for caller-side routing.
    fn uri_schemes(&self) -> Vec<String>;

    fn description(&self) -> &'static str;

    fn backend_type(&self) -> StorageType;

    /// Create a session whose relative names resolve under `path`.
    async fn new_session(&self, path: &str) -> StorageResult<Box<dyn ObjectSession>>;

    /// Publish the driver's content under a stable name.
    async fn publish(&self) -> StorageResult<String>;
}

/// A handle bound to one logical output path.
#[async_trait]
pub trait ObjectSession: Send + Sync {
    /// Save `data` under `name` (relative to the session path) and return its
    /// durable identifier.
    async fn save_data(
        &self,
        name: &str,
        data: DataReader,
        fields: Option<&FileProperties>,
        timeout: Duration,
    ) -> StorageResult<SaveDataOutput>;

    /// Fetch previously saved content by its identifier.
    async fn read_data(&self, name: &str) -> StorageResult<FileInfoReader>;

    async fn read_data_range(&self, name: &str, byte_range: &str)
        -> StorageResult<FileInfoReader>;

    async fn presign(&self, name: &str, expire: Duration) -> StorageResult<String>;

    async fn list_files(&self, prefix: &str, delim: &str) -> StorageResult<PageInfo>;

    async fn delete_file(&self, name: &str) -> StorageResult<()>;

    fn get_info(&self) -> OsInfo;

    /// Whether stored objects live outside infrastructure this application controls.
    fn is_external(&self) -> bool;

    /// Whether `url` points into this session's storage.
    fn is_own(&self, url: &str) -> bool;

    /// Release the session. Backends without server-side session state do nothing.
    fn end_session(&self);
}
