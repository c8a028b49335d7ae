//! Configuration module
//!
//! This module provides the configuration structures used to construct storage
//! drivers: the storage network endpoint, credentials, postage stamps and the
//! external tool settings.

use std::env;

use crate::storage_types::UploadMode;

// Common constants
const REQUEST_TIMEOUT_SECS: u64 = 60;
const SWARM_CLI_PATH: &str = "swarm-cli";
const FEED_IDENTITY: &str = "main";
const FEED_PASSWORD: &str = "1234";

/// Base configuration shared by every binary
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub environment: String,
    pub request_timeout_secs: u64,
}

/// Swarm storage configuration
#[derive(Clone)]
pub struct SwarmConfig {
    /// Storage network endpoint, e.g. `http://localhost:1633`
    pub endpoint: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// Pre-issued bearer token, used when no API key is configured
    pub jwt: Option<String>,
    /// Stamp for immutable content (video segments)
    pub stamp: String,
    /// Stamp for the mutable feed manifest (playlists)
    pub feed_stamp: String,
    pub upload_mode: UploadMode,
    pub cli_path: String,
    pub feed_identity: String,
    pub feed_password: String,
}

// Credentials stay out of debug output.
impl std::fmt::Debug for SwarmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwarmConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .field("jwt", &self.jwt.as_ref().map(|_| "<redacted>"))
            .field("stamp", &self.stamp)
            .field("feed_stamp", &self.feed_stamp)
            .field("upload_mode", &self.upload_mode)
            .field("cli_path", &self.cli_path)
            .field("feed_identity", &self.feed_identity)
            .finish_non_exhaustive()
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub swarm: SwarmConfig,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let base = BaseConfig {
            environment: var("ENVIRONMENT")
                .or_else(|| var("APP_ENV"))
                .unwrap_or_else(|| "development".to_string()),
            request_timeout_secs: var("SWARM_REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(REQUEST_TIMEOUT_SECS),
        };

        let upload_mode = match var("SWARM_UPLOAD_MODE") {
            Some(mode) => mode.parse()?,
            None => UploadMode::default(),
        };

        let swarm = SwarmConfig {
            endpoint: var("SWARM_API_URL")
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .ok_or_else(|| anyhow::anyhow!("SWARM_API_URL must be set"))?,
            api_key: var("SWARM_API_KEY"),
            api_secret: var("SWARM_API_SECRET"),
            jwt: var("SWARM_JWT"),
            stamp: var("SWARM_STAMP")
                .ok_or_else(|| anyhow::anyhow!("SWARM_STAMP must be set"))?,
            feed_stamp: var("SWARM_FEED_STAMP")
                .ok_or_else(|| anyhow::anyhow!("SWARM_FEED_STAMP must be set"))?,
            upload_mode,
            cli_path: var("SWARM_CLI_PATH").unwrap_or_else(|| SWARM_CLI_PATH.to_string()),
            feed_identity: var("SWARM_FEED_IDENTITY").unwrap_or_else(|| FEED_IDENTITY.to_string()),
            feed_password: var("SWARM_FEED_PASSWORD").unwrap_or_else(|| FEED_PASSWORD.to_string()),
        };

        let config = Config { base, swarm };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let swarm = &self.swarm;

        if !swarm.endpoint.starts_with("http://") && !swarm.endpoint.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "SWARM_API_URL must be an http:// or https:// URL"
            ));
        }

        if swarm.stamp == swarm.feed_stamp {
            return Err(anyhow::anyhow!(
                "SWARM_STAMP and SWARM_FEED_STAMP must be different stamps"
            ));
        }

        if swarm.api_key.is_some() && swarm.api_secret.is_none() {
            return Err(anyhow::anyhow!(
                "SWARM_API_SECRET must be set when SWARM_API_KEY is set"
            ));
        }

        if swarm.api_key.is_none() && swarm.jwt.is_none() {
            return Err(anyhow::anyhow!(
                "Either SWARM_API_KEY/SWARM_API_SECRET or SWARM_JWT must be set"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.base.request_timeout_secs
    }

    pub fn swarm(&self) -> &SwarmConfig {
        &self.swarm
    }
}
