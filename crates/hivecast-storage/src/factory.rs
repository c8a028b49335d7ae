#[cfg(feature = "storage-swarm")]
use crate::swarm::{Credentials, StampInfo, SwarmDriver, TokenCache};
#[cfg(feature = "storage-swarm")]
use crate::{StorageError, StorageResult};
use crate::ObjectStoreDriver;
#[cfg(feature = "storage-swarm")]
use hivecast_core::Config;
use std::sync::Arc;
#[cfg(feature = "storage-swarm")]
use std::time::Duration;

/// Create the Swarm driver described by `config`.
///
/// An API key/secret pair takes precedence over a pre-issued JWT. Pass the same
/// `token_cache` to every driver that should share one bearer token.
#[cfg(feature = "storage-swarm")]
pub fn create_driver(
    config: &Config,
    token_cache: Arc<TokenCache>,
) -> StorageResult<Arc<dyn ObjectStoreDriver>> {
    let swarm = config.swarm();

    let credentials = match (&swarm.api_key, &swarm.api_secret, &swarm.jwt) {
        (Some(key), Some(secret), _) => Credentials::ApiKey {
            key: key.clone(),
            secret: secret.clone(),
        },
        (_, _, Some(jwt)) => Credentials::Jwt(jwt.clone()),
        _ => {
            return Err(StorageError::ConfigError(
                "SWARM_API_KEY/SWARM_API_SECRET or SWARM_JWT not configured".to_string(),
            ))
        }
    };

    let stamps = StampInfo {
        stamp: swarm.stamp.clone(),
        feed_stamp: swarm.feed_stamp.clone(),
    };

    let driver = SwarmDriver::builder(&swarm.endpoint, credentials, stamps)
        .token_cache(token_cache)
        .upload_mode(swarm.upload_mode)
        .cli_path(&swarm.cli_path)
        .feed_identity(&swarm.feed_identity, &swarm.feed_password)
        .request_timeout(Duration::from_secs(config.request_timeout_secs()))
        .build()?;

    tracing::info!(
        endpoint = %driver.endpoint(),
        upload_mode = %driver.upload_mode(),
        "Swarm storage driver created"
    );

    Ok(Arc::new(driver))
}

/// Pick the driver whose URI scheme prefixes `uri` up to a path boundary.
///
/// `bzz://node` answers `bzz://node` and `bzz://node/...` but not `bzz://node-b/...`.
pub fn select_driver(
    drivers: &[Arc<dyn ObjectStoreDriver>],
    uri: &str,
) -> Option<Arc<dyn ObjectStoreDriver>> {
    drivers
        .iter()
        .find(|driver| {
            driver
                .uri_schemes()
                .iter()
                .any(|scheme| {
                    uri.strip_prefix(scheme.as_str())
                        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
                })
        })
        .cloned()
}
