//! Bearer-token authentication against the storage node.

use crate::traits::{StorageError, StorageResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hivecast_core::constants::{AUTH_TOKEN_EXPIRY_SECS, AUTH_TOKEN_ROLE};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::future::Future;
use tokio::sync::OnceCell;

/// Write-once cache for the bearer token obtained from `/auth`.
///
/// The cache is assigned at most once, by the first successful authentication,
/// and is never refreshed afterwards. Every driver holding the same cache shares
/// the token, including drivers configured with different credentials. Callers
/// that mix credential sets in one process must give each set its own cache.
#[derive(Default)]
pub struct TokenCache {
    token: OnceCell<String>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached token, if authentication has already happened.
    pub fn get(&self) -> Option<&str> {
        self.token.get().map(String::as_str)
    }

    /// Return the cached token, running `authenticate` only if the cache is empty.
    ///
    /// Concurrent callers wait for the first initialisation instead of
    /// authenticating again. A failed attempt leaves the cache empty.
    pub async fn get_or_authenticate<F, Fut>(&self, authenticate: F) -> StorageResult<&str>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = StorageResult<String>>,
    {
        self.token
            .get_or_try_init(authenticate)
            .await
            .map(String::as_str)
    }
}

impl Debug for TokenCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TokenCache")
            .field("populated", &self.token.initialized())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    key: String,
}

/// Exchange `user`/`pass` for a bearer token at `{endpoint}/auth`.
///
/// Sends a single request; any transport failure, non-success status or
/// undecodable body is an `AuthenticationFailed`. There is no retry.
pub async fn authenticate(
    client: &Client,
    endpoint: &str,
    user: &str,
    pass: &str,
) -> StorageResult<String> {
    let url = format!("{}/auth", endpoint.trim_end_matches('/'));
    let credentials = STANDARD.encode(format!("{}:{}", user, pass));
    let start = std::time::Instant::now();

    let response = client
        .post(&url)
        .header("Authorization", format!("Basic {}", credentials))
        .json(&json!({
            "role": AUTH_TOKEN_ROLE,
            "expiry": AUTH_TOKEN_EXPIRY_SECS,
        }))
        .send()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, url = %url, "Swarm authentication request failed");
            StorageError::AuthenticationFailed(e.to_string())
        })?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::error!(
            status = %status,
            url = %url,
            "Swarm authentication rejected"
        );
        return Err(StorageError::AuthenticationFailed(format!(
            "{} - {}",
            status, error_text
        )));
    }

    let body: AuthResponse = response.json().await.map_err(|e| {
        tracing::error!(error = %e, url = %url, "Swarm authentication response malformed");
        StorageError::AuthenticationFailed(format!("Failed to parse auth response: {}", e))
    })?;

    if body.key.is_empty() {
        return Err(StorageError::AuthenticationFailed(
            "Auth response contained an empty key".to_string(),
        ));
    }

    tracing::info!(
        url = %url,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Obtained Swarm bearer token"
    );

    Ok(body.key)
}
