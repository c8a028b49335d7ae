use super::client::SwarmUploader;
use super::driver::{DriverInner, SwarmDriver};
use super::reference::reference_from_url;
use crate::content::{content_type_for_path, ContentKind};
use crate::paths::effective_path;
use crate::traits::{
    DataReader, FileInfo, FileInfoReader, FileProperties, ObjectSession, OsInfo, PageInfo,
    SaveDataOutput, StorageError, StorageResult, SwarmOsInfo,
};
use async_trait::async_trait;
use futures::StreamExt;
use hivecast_core::constants::PLAYLIST_CONTENT_TYPE;
use hivecast_core::StorageType;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;

/// Name submitted when a save target resolves to the root.
pub const DEFAULT_OBJECT_NAME: &str = "data";

/// A Swarm session bound to one logical output path (one stream, one output root).
///
/// Sessions hold no server-side state; dropping one releases nothing remotely.
pub struct SwarmSession {
    driver: Arc<DriverInner>,
    base_path: String,
    bearer_token: String,
    uploader: Arc<dyn SwarmUploader>,
}

impl SwarmSession {
    pub(crate) fn new(
        driver: Arc<DriverInner>,
        base_path: &str,
        bearer_token: String,
        uploader: Arc<dyn SwarmUploader>,
    ) -> Self {
        Self {
            driver,
            base_path: base_path.to_string(),
            bearer_token,
            uploader,
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Where `name` lands relative to this session; empty for the root.
    pub fn effective_path(&self, name: &str) -> String {
        effective_path(&self.base_path, name)
    }

    /// The driver this session was created from.
    pub fn os(&self) -> SwarmDriver {
        SwarmDriver::from_inner(self.driver.clone())
    }

    pub(crate) fn bearer_token(&self) -> &str {
        &self.bearer_token
    }
}

impl Debug for SwarmSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SwarmSession")
            .field("host", &self.driver.hostname)
            .field("base_path", &self.base_path)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ObjectSession for SwarmSession {
    async fn save_data(
        &self,
        name: &str,
        data: DataReader,
        _fields: Option<&FileProperties>,
        timeout: Duration,
    ) -> StorageResult<SaveDataOutput> {
        let full_path = self.effective_path(name);
        let path = if full_path.is_empty() {
            DEFAULT_OBJECT_NAME
        } else {
            full_path.as_str()
        };
        let kind = ContentKind::classify(path);

        tracing::info!(
            path = %path,
            kind = ?kind,
            host = %self.driver.hostname,
            "Saving data to swarm"
        );

        let stamps = &self.driver.stamps;
        let url = match kind {
            ContentKind::Manifest => {
                self.uploader
                    .upload_feed_manifest(
                        path,
                        PLAYLIST_CONTENT_TYPE,
                        &stamps.feed_stamp,
                        data,
                        timeout,
                    )
                    .await?
            }
            ContentKind::Segment => {
                let content_type = content_type_for_path(path);
                self.uploader
                    .upload_file(path, content_type, &stamps.stamp, data, timeout)
                    .await?
            }
        };

        Ok(SaveDataOutput { url })
    }

    async fn read_data(&self, name: &str) -> StorageResult<FileInfoReader> {
        let reference = reference_from_url(name);
        if reference.is_empty() {
            return Err(StorageError::InvalidKey(
                "A swarm reference is required".to_string(),
            ));
        }

        let url = format!("{}/bzz/{}", self.driver.endpoint, reference);
        let start = std::time::Instant::now();

        let response = self
            .driver
            .http_client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.bearer_token))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, url = %url, "Swarm download failed");
                StorageError::DownloadFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = %status, url = %url, "Swarm download failed");
            return Err(StorageError::DownloadFailed(format!(
                "{} returned {}",
                url, status
            )));
        }

        let size = response.content_length();
        let etag = response
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim_matches('"').to_string());

        tracing::info!(
            reference = %reference,
            size_bytes = ?size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Swarm download started"
        );

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| StorageError::DownloadFailed(e.to_string())));

        Ok(FileInfoReader {
            file_info: FileInfo {
                name: reference.to_string(),
                size,
                etag,
            },
            body: Box::pin(body),
        })
    }

    async fn read_data_range(
        &self,
        _name: &str,
        _byte_range: &str,
    ) -> StorageResult<FileInfoReader> {
        Err(StorageError::NotSupported("read_data_range"))
    }

    async fn presign(&self, _name: &str, _expire: Duration) -> StorageResult<String> {
        Err(StorageError::NotSupported("presign"))
    }

    async fn list_files(&self, _prefix: &str, _delim: &str) -> StorageResult<PageInfo> {
        Err(StorageError::NotSupported("list_files"))
    }

    async fn delete_file(&self, _name: &str) -> StorageResult<()> {
        Err(StorageError::NotSupported("delete_file"))
    }

    fn get_info(&self) -> OsInfo {
        OsInfo {
            storage_type: StorageType::Swarm,
            swarm_info: Some(SwarmOsInfo {
                host: self.driver.hostname.clone(),
                video_stamp: self.driver.stamps.stamp.clone(),
                feed_stamp: self.driver.stamps.feed_stamp.clone(),
            }),
        }
    }

    fn is_external(&self) -> bool {
        false
    }

    fn is_own(&self, _url: &str) -> bool {
        true
    }

    fn end_session(&self) {}
}
