use super::auth::{authenticate, TokenCache};
use super::client::{ApiUploader, CliUploader, CommandRunner, SwarmCli, SwarmUploader};
use super::session::SwarmSession;
use crate::traits::{ObjectSession, ObjectStoreDriver, StorageError, StorageResult};
use async_trait::async_trait;
use hivecast_core::constants::SWARM_URI_SCHEME;
use hivecast_core::{StorageType, UploadMode};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Postage stamps authorizing writes.
///
/// `stamp` pays for immutable content (video segments); `feed_stamp` pays for
/// the feed that always points at the latest playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampInfo {
    pub stamp: String,
    #[serde(rename = "feedstamp")]
    pub feed_stamp: String,
}

/// How sessions obtain their bearer token.
#[derive(Clone)]
pub enum Credentials {
    /// Exchanged for a token on the first session; consumed afterwards.
    ApiKey { key: String, secret: String },
    /// Pre-issued token used as is.
    Jwt(String),
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Credentials::ApiKey { .. } => f.write_str("ApiKey(<redacted>)"),
            Credentials::Jwt(_) => f.write_str("Jwt(<redacted>)"),
        }
    }
}

enum CredentialState {
    Pending(Credentials),
    /// The API key was spent; later sessions reuse the cached token.
    Consumed,
}

/// Shared state behind a [`SwarmDriver`] and every session it creates.
pub(crate) struct DriverInner {
    pub(crate) endpoint: String,
    pub(crate) hostname: String,
    pub(crate) stamps: StampInfo,
    pub(crate) http_client: Client,
    upload_mode: UploadMode,
    credentials: Mutex<CredentialState>,
    token_cache: Arc<TokenCache>,
    runner: Arc<dyn CommandRunner>,
    feed_identity: String,
    feed_password: String,
}

impl DriverInner {
    /// Resolve the bearer token for a new session.
    async fn bearer_token(&self) -> StorageResult<String> {
        let mut state = self.credentials.lock().await;

        let (key, secret) = match &*state {
            CredentialState::Pending(Credentials::Jwt(token)) => return Ok(token.clone()),
            CredentialState::Pending(Credentials::ApiKey { key, secret }) => {
                (key.clone(), secret.clone())
            }
            CredentialState::Consumed => {
                return self
                    .token_cache
                    .get()
                    .map(str::to_string)
                    .ok_or_else(|| {
                        StorageError::AuthenticationFailed(
                            "API key already consumed and no cached token".to_string(),
                        )
                    })
            }
        };

        let token = self
            .token_cache
            .get_or_authenticate(|| authenticate(&self.http_client, &self.endpoint, &key, &secret))
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    host = %self.hostname,
                    "Failed to create new session"
                );
                e
            })?
            .to_string();

        // The key is single use; later sessions read the cache.
        *state = CredentialState::Consumed;
        Ok(token)
    }

    fn uploader(&self, bearer_token: String) -> Arc<dyn SwarmUploader> {
        let feeds = CliUploader::new(
            self.runner.clone(),
            &self.endpoint,
            bearer_token.clone(),
            &self.feed_identity,
            &self.feed_password,
        );

        match self.upload_mode {
            UploadMode::Api => Arc::new(ApiUploader::new(
                self.http_client.clone(),
                &self.endpoint,
                bearer_token,
                feeds,
            )),
            UploadMode::Cli => Arc::new(feeds),
        }
    }
}

impl Debug for DriverInner {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SwarmDriver")
            .field("endpoint", &self.endpoint)
            .field("hostname", &self.hostname)
            .field("stamps", &self.stamps)
            .field("upload_mode", &self.upload_mode)
            .field("token_cache", &self.token_cache)
            .finish_non_exhaustive()
    }
}

/// Swarm storage driver
///
/// Describes one storage node and the stamps used to write to it. Cheap to
/// clone; clones share credentials and the token cache.
#[derive(Clone, Debug)]
pub struct SwarmDriver {
    inner: Arc<DriverInner>,
}

impl SwarmDriver {
    /// Start building a driver for `endpoint` (e.g. `http://localhost:1633`).
    pub fn builder(
        endpoint: impl Into<String>,
        credentials: Credentials,
        stamps: StampInfo,
    ) -> SwarmDriverBuilder {
        SwarmDriverBuilder {
            endpoint: endpoint.into(),
            credentials,
            stamps,
            upload_mode: UploadMode::default(),
            token_cache: None,
            runner: None,
            cli_path: "swarm-cli".to_string(),
            feed_identity: "main".to_string(),
            feed_password: "1234".to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Create a session rooted at `path`.
    ///
    /// The first call on a driver built with an API key authenticates, unless the
    /// token cache is already populated; every later call reuses the cached token.
    pub async fn create_session(&self, path: &str) -> StorageResult<SwarmSession> {
        let token = self.inner.bearer_token().await?;
        let uploader = self.inner.uploader(token.clone());
        Ok(SwarmSession::new(
            self.inner.clone(),
            path,
            token,
            uploader,
        ))
    }

    pub(crate) fn from_inner(inner: Arc<DriverInner>) -> Self {
        Self { inner }
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    pub fn hostname(&self) -> &str {
        &self.inner.hostname
    }

    pub fn stamps(&self) -> &StampInfo {
        &self.inner.stamps
    }

    pub fn upload_mode(&self) -> UploadMode {
        self.inner.upload_mode
    }

    pub fn token_cache(&self) -> &Arc<TokenCache> {
        &self.inner.token_cache
    }
}

#[async_trait]
impl ObjectStoreDriver for SwarmDriver {
    fn uri_schemes(&self) -> Vec<String> {
        vec![format!("{}{}", SWARM_URI_SCHEME, self.inner.hostname)]
    }

    fn description(&self) -> &'static str {
        "Swarm storage driver"
    }

    fn backend_type(&self) -> StorageType {
        StorageType::Swarm
    }

    async fn new_session(&self, path: &str) -> StorageResult<Box<dyn ObjectSession>> {
        let session = self.create_session(path).await?;
        Ok(Box::new(session))
    }

    async fn publish(&self) -> StorageResult<String> {
        Err(StorageError::NotSupported("publish"))
    }
}

/// Builder for [`SwarmDriver`].
pub struct SwarmDriverBuilder {
    endpoint: String,
    credentials: Credentials,
    stamps: StampInfo,
    upload_mode: UploadMode,
    token_cache: Option<Arc<TokenCache>>,
    runner: Option<Arc<dyn CommandRunner>>,
    cli_path: String,
    feed_identity: String,
    feed_password: String,
    request_timeout: Duration,
}

impl SwarmDriverBuilder {
    /// Share a token cache with other drivers. Without one the driver gets its own.
    pub fn token_cache(mut self, token_cache: Arc<TokenCache>) -> Self {
        self.token_cache = Some(token_cache);
        self
    }

    pub fn upload_mode(mut self, upload_mode: UploadMode) -> Self {
        self.upload_mode = upload_mode;
        self
    }

    pub fn cli_path(mut self, cli_path: impl Into<String>) -> Self {
        self.cli_path = cli_path.into();
        self
    }

    /// Replace the external tool, e.g. with an in-process fake.
    pub fn command_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn feed_identity(
        mut self,
        identity: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.feed_identity = identity.into();
        self.feed_password = password.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn build(self) -> StorageResult<SwarmDriver> {
        let endpoint = self.endpoint.trim().trim_end_matches('/').to_string();
        let url = Url::parse(&endpoint).map_err(|e| {
            StorageError::ConfigError(format!("Invalid endpoint {}: {}", endpoint, e))
        })?;
        let host = url.host_str().ok_or_else(|| {
            StorageError::ConfigError(format!("Endpoint {} has no host", endpoint))
        })?;
        let hostname = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        if self.stamps.stamp.is_empty() || self.stamps.feed_stamp.is_empty() {
            return Err(StorageError::ConfigError(
                "Both the content stamp and the feed stamp are required".to_string(),
            ));
        }

        let runner: Arc<dyn CommandRunner> = match self.runner {
            Some(runner) => runner,
            None => Arc::new(SwarmCli::new(self.cli_path)?),
        };

        let http_client = Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| {
                StorageError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        let inner = DriverInner {
            endpoint,
            hostname,
            stamps: self.stamps,
            http_client,
            upload_mode: self.upload_mode,
            credentials: Mutex::new(CredentialState::Pending(self.credentials)),
            token_cache: self.token_cache.unwrap_or_default(),
            runner,
            feed_identity: self.feed_identity,
            feed_password: self.feed_password,
        };

        Ok(SwarmDriver {
            inner: Arc::new(inner),
        })
    }
}
