//! Shared fixtures for the Swarm storage integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use hivecast_storage::swarm::{CommandRunner, Credentials, StampInfo, SwarmDriver};
use hivecast_storage::traits::DataReader;
use hivecast_storage::{StorageError, StorageResult};
use std::sync::{Arc, Mutex};

pub const CONTENT_STAMP: &str = "a1b2c3-content";
pub const FEED_STAMP: &str = "d4e5f6-feed";

/// In-process stand-in for `swarm-cli` that records every invocation.
pub struct FakeSwarmCli {
    output: String,
    pub invocations: Mutex<Vec<Invocation>>,
}

#[derive(Debug, Clone)]
pub struct Invocation {
    pub args: Vec<String>,
    pub stdin: Vec<u8>,
}

impl Invocation {
    /// Value following `flag`, if present.
    pub fn arg(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl FakeSwarmCli {
    pub fn printing(output: &str) -> Arc<Self> {
        Arc::new(Self {
            output: output.to_string(),
            invocations: Mutex::new(Vec::new()),
        })
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for FakeSwarmCli {
    async fn run(&self, args: &[String], stdin: Vec<u8>) -> StorageResult<String> {
        self.invocations.lock().unwrap().push(Invocation {
            args: args.to_vec(),
            stdin,
        });
        if self.output.is_empty() {
            return Err(StorageError::UploadFailed("swarm-cli exited with 1".to_string()));
        }
        Ok(self.output.clone())
    }
}

pub fn stamps() -> StampInfo {
    StampInfo {
        stamp: CONTENT_STAMP.to_string(),
        feed_stamp: FEED_STAMP.to_string(),
    }
}

pub fn api_key() -> Credentials {
    Credentials::ApiKey {
        key: "admin".to_string(),
        secret: "secret".to_string(),
    }
}

/// Driver against `endpoint` whose tool invocations go to `cli`.
pub fn driver_with(
    endpoint: &str,
    credentials: Credentials,
    cli: Arc<FakeSwarmCli>,
) -> SwarmDriver {
    SwarmDriver::builder(endpoint, credentials, stamps())
        .command_runner(cli)
        .build()
        .expect("driver builds")
}

pub fn reader(data: &'static [u8]) -> DataReader {
    Box::pin(std::io::Cursor::new(data))
}
