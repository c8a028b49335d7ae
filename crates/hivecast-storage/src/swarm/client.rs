//! Upload client for the Swarm network.
//!
//! Two interchangeable uploaders implement [`SwarmUploader`]:
//!
//! - [`ApiUploader`] posts content straight to the node's `/bytes` endpoint and
//!   hands feed manifests to the external tool, which has no API equivalent.
//! - [`CliUploader`] runs the external tool (`swarm-cli`) for every upload and
//!   scrapes the reference out of its output.
//!
//! Both buffer the whole input before submitting it, log failures once at error
//! level and return them unchanged. Nothing is retried.

use super::reference::{parse_reference, ReferencePattern};
use crate::traits::{DataReader, StorageError, StorageResult};
use async_trait::async_trait;
use hivecast_core::constants::POSTAGE_BATCH_HEADER;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

/// Performs the two upload operations against the storage network.
#[async_trait]
pub trait SwarmUploader: Send + Sync {
    /// Upload immutable content and return its reference.
    async fn upload_file(
        &self,
        path: &str,
        content_type: &str,
        stamp: &str,
        data: DataReader,
        timeout: Duration,
    ) -> StorageResult<String>;

    /// Publish `data` as the latest update of the feed named after `path` and
    /// return the feed manifest reference.
    async fn upload_feed_manifest(
        &self,
        path: &str,
        content_type: &str,
        stamp: &str,
        data: DataReader,
        timeout: Duration,
    ) -> StorageResult<String>;
}

/// Runs the external command-line tool with a fixed stdin payload.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run with `args`, feed `stdin` and return the combined stdout and stderr text.
    async fn run(&self, args: &[String], stdin: Vec<u8>) -> StorageResult<String>;
}

/// [`CommandRunner`] spawning the `swarm-cli` executable.
#[derive(Debug, Clone)]
pub struct SwarmCli {
    program: String,
}

impl SwarmCli {
    pub fn new(program: impl Into<String>) -> StorageResult<Self> {
        let program = program.into();
        let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
        if program.is_empty() || program.chars().any(|c| dangerous_chars.contains(&c)) {
            return Err(StorageError::ConfigError(format!(
                "Invalid swarm-cli path: {:?}",
                program
            )));
        }

        Ok(Self { program })
    }
}

#[async_trait]
impl CommandRunner for SwarmCli {
    async fn run(&self, args: &[String], stdin: Vec<u8>) -> StorageResult<String> {
        tracing::debug!(
            program = %self.program,
            args = ?redact_args(args),
            stdin_bytes = stdin.len(),
            "Running swarm-cli"
        );

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                StorageError::UploadFailed(format!("Failed to execute {}: {}", self.program, e))
            })?;

        // Feed stdin while the output is drained so a chatty child cannot block us.
        let mut child_stdin = child.stdin.take().ok_or_else(|| {
            StorageError::UploadFailed("swarm-cli stdin was not captured".to_string())
        })?;
        let writer = tokio::spawn(async move {
            child_stdin.write_all(&stdin).await?;
            child_stdin.shutdown().await
        });

        let output = child.wait_with_output().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to wait for {}: {}", self.program, e))
        })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(StorageError::UploadFailed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                combined.trim()
            )));
        }

        // A tool that exits cleanly without draining stdin closes the pipe early.
        match writer.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                tracing::debug!(
                    program = %self.program,
                    "swarm-cli closed stdin before reading it all"
                );
            }
            Ok(Err(e)) => {
                return Err(StorageError::UploadFailed(format!(
                    "Failed to write stdin of {}: {}",
                    self.program, e
                )))
            }
            Err(e) => {
                return Err(StorageError::UploadFailed(format!(
                    "stdin writer for {} panicked: {}",
                    self.program, e
                )))
            }
        }

        Ok(combined.trim().to_string())
    }
}

/// Replace secrets in an argument list before logging it.
fn redact_args(args: &[String]) -> Vec<String> {
    let mut redacted = Vec::with_capacity(args.len());
    let mut hide_next = false;
    for arg in args {
        if hide_next {
            redacted.push("<redacted>".to_string());
            hide_next = false;
        } else if arg.starts_with("Authorization:") {
            redacted.push("Authorization: <redacted>".to_string());
        } else {
            hide_next = arg == "--password";
            redacted.push(arg.clone());
        }
    }
    redacted
}

/// Read the whole input; the tool needs a fixed-size stdin and the API a sized body.
async fn buffer(mut data: DataReader, path: &str) -> StorageResult<Vec<u8>> {
    let mut buf = Vec::new();
    data.read_to_end(&mut buf).await.map_err(|e| {
        tracing::error!(error = %e, path = %path, "Error reading upload data, aborting upload");
        StorageError::ReadFailed(e.to_string())
    })?;
    Ok(buf)
}

/// swarm-cli has no deadline flag; a running upload cannot be cut short.
fn log_ignored_timeout(timeout: Duration, path: &str) {
    if !timeout.is_zero() {
        tracing::debug!(
            path = %path,
            timeout_ms = timeout.as_millis() as u64,
            "Timeout not applied to swarm-cli upload"
        );
    }
}

/// Feed topics and names may not contain path separators.
fn feed_safe(value: &str) -> String {
    value.replace('/', "_")
}

/// [`SwarmUploader`] driving the external tool for every upload.
#[derive(Clone)]
pub struct CliUploader {
    runner: Arc<dyn CommandRunner>,
    endpoint: String,
    bearer_token: String,
    feed_identity: String,
    feed_password: String,
}

impl CliUploader {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        endpoint: impl Into<String>,
        bearer_token: impl Into<String>,
        feed_identity: impl Into<String>,
        feed_password: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            endpoint: endpoint.into(),
            bearer_token: bearer_token.into(),
            feed_identity: feed_identity.into(),
            feed_password: feed_password.into(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Authorization: Bearer {}", self.bearer_token)
    }

    /// Run the tool and extract the reference, turning an unparseable output into an error.
    async fn run_and_parse(
        &self,
        args: Vec<String>,
        payload: Vec<u8>,
        pattern: ReferencePattern,
    ) -> StorageResult<String> {
        let output = self.runner.run(&args, payload).await?;
        let reference = parse_reference(&output, pattern);
        if reference.is_empty() {
            return Err(StorageError::UploadFailed(format!(
                "No reference found in swarm-cli output: {}",
                output
            )));
        }
        Ok(reference)
    }
}

impl Debug for CliUploader {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CliUploader")
            .field("endpoint", &self.endpoint)
            .field("feed_identity", &self.feed_identity)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SwarmUploader for CliUploader {
    async fn upload_file(
        &self,
        path: &str,
        content_type: &str,
        stamp: &str,
        data: DataReader,
        timeout: Duration,
    ) -> StorageResult<String> {
        log_ignored_timeout(timeout, path);
        let payload = buffer(data, path).await?;
        let size = payload.len();
        let start = std::time::Instant::now();

        let args = vec![
            "upload".to_string(),
            "--stamp".to_string(),
            stamp.to_string(),
            "--name".to_string(),
            path.to_string(),
            "--content-type".to_string(),
            content_type.to_string(),
            "--bee-api-url".to_string(),
            self.endpoint.clone(),
            "-H".to_string(),
            self.auth_header(),
            "--stdin".to_string(),
        ];

        let reference = self
            .run_and_parse(args, payload, ReferencePattern::Url)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    path = %path,
                    stamp = %stamp,
                    "Error uploading file to swarm"
                );
                e
            })?;

        tracing::info!(
            path = %path,
            reference = %reference,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Uploaded file to swarm"
        );

        Ok(reference)
    }

    async fn upload_feed_manifest(
        &self,
        path: &str,
        content_type: &str,
        stamp: &str,
        data: DataReader,
        timeout: Duration,
    ) -> StorageResult<String> {
        log_ignored_timeout(timeout, path);
        let payload = buffer(data, path).await?;
        let size = payload.len();
        let start = std::time::Instant::now();
        let topic = feed_safe(path);

        let args = vec![
            "feed".to_string(),
            "upload".to_string(),
            "--topic-string".to_string(),
            topic.clone(),
            "--stamp".to_string(),
            stamp.to_string(),
            "--name".to_string(),
            topic.clone(),
            "--content-type".to_string(),
            content_type.to_string(),
            "--bee-api-url".to_string(),
            self.endpoint.clone(),
            "-H".to_string(),
            self.auth_header(),
            "--identity".to_string(),
            self.feed_identity.clone(),
            "--password".to_string(),
            self.feed_password.clone(),
            "--stdin".to_string(),
        ];

        let reference = self
            .run_and_parse(args, payload, ReferencePattern::FeedManifest)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    topic = %topic,
                    stamp = %stamp,
                    "Error uploading feed manifest to swarm"
                );
                e
            })?;

        tracing::info!(
            topic = %topic,
            reference = %reference,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Uploaded feed manifest to swarm"
        );

        Ok(reference)
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    reference: String,
}

/// [`SwarmUploader`] posting content to the node API; feed manifests go through the tool.
#[derive(Clone)]
pub struct ApiUploader {
    http_client: Client,
    endpoint: String,
    bearer_token: String,
    feeds: CliUploader,
}

impl ApiUploader {
    pub fn new(
        http_client: Client,
        endpoint: impl Into<String>,
        bearer_token: impl Into<String>,
        feeds: CliUploader,
    ) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
            bearer_token: bearer_token.into(),
            feeds,
        }
    }

    async fn post_bytes(
        &self,
        path: &str,
        content_type: &str,
        stamp: &str,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> StorageResult<String> {
        let url = format!("{}/bytes", self.endpoint);

        let part = reqwest::multipart::Part::bytes(payload)
            .file_name(path.to_string())
            .mime_str(content_type)
            .map_err(|e| StorageError::UploadFailed(format!("Invalid content type: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let mut request = self
            .http_client
            .post(&url)
            .header(POSTAGE_BATCH_HEADER, stamp)
            .header("Authorization", format!("Bearer {}", self.bearer_token))
            .multipart(form);
        if !timeout.is_zero() {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StorageError::UploadFailed(format!(
                "Swarm upload failed: {} - {}",
                status, error_text
            )));
        }

        let body: UploadResponse = response.json().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to parse upload response: {}", e))
        })?;

        if body.reference.is_empty() {
            return Err(StorageError::UploadFailed(
                "Upload response contained an empty reference".to_string(),
            ));
        }

        Ok(body.reference)
    }
}

impl Debug for ApiUploader {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ApiUploader")
            .field("endpoint", &self.endpoint)
            .field("feeds", &self.feeds)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SwarmUploader for ApiUploader {
    async fn upload_file(
        &self,
        path: &str,
        content_type: &str,
        stamp: &str,
        data: DataReader,
        timeout: Duration,
    ) -> StorageResult<String> {
        let payload = buffer(data, path).await?;
        let size = payload.len();
        let start = std::time::Instant::now();

        let reference = self
            .post_bytes(path, content_type, stamp, payload, timeout)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    path = %path,
                    stamp = %stamp,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Error uploading file to swarm"
                );
                e
            })?;

        tracing::info!(
            path = %path,
            reference = %reference,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Uploaded file to swarm"
        );

        Ok(reference)
    }

    async fn upload_feed_manifest(
        &self,
        path: &str,
        content_type: &str,
        stamp: &str,
        data: DataReader,
        timeout: Duration,
    ) -> StorageResult<String> {
        self.feeds
            .upload_feed_manifest(path, content_type, stamp, data, timeout)
            .await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every invocation and answers with canned output.
    #[derive(Default)]
    pub(crate) struct RecordingRunner {
        pub(crate) calls: Mutex<Vec<(Vec<String>, Vec<u8>)>>,
        pub(crate) output: String,
        pub(crate) fail: bool,
    }

    impl RecordingRunner {
        pub(crate) fn replying(output: &str) -> Arc<Self> {
            Arc::new(Self {
                output: output.to_string(),
                ..Default::default()
            })
        }
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, args: &[String], stdin: Vec<u8>) -> StorageResult<String> {
            self.calls.lock().unwrap().push((args.to_vec(), stdin));
            if self.fail {
                return Err(StorageError::UploadFailed("exit status: 1".to_string()));
            }
            Ok(self.output.clone())
        }
    }

    fn reader(data: &'static [u8]) -> DataReader {
        Box::pin(std::io::Cursor::new(data))
    }

    fn cli(runner: Arc<RecordingRunner>) -> CliUploader {
        CliUploader::new(runner, "http://node:1633", "tok", "main", "1234")
    }

    fn arg_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    /// Reader that fails on first use.
    struct BrokenReader;

    impl tokio::io::AsyncRead for BrokenReader {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "connection reset",
            )))
        }
    }

    #[tokio::test]
    async fn test_cli_upload_file_arguments() {
        let runner = RecordingRunner::replying("Swarm hash: ab12\nURL: http://node:1633/bzz/ab12/");
        let uploader = cli(runner.clone());

        let reference = uploader
            .upload_file(
                "videos/seg001.ts",
                "video/mp2t",
                "stamp-a",
                reader(b"segment"),
                Duration::ZERO,
            )
            .await
            .unwrap();
        assert_eq!(reference, "http://node:1633/bzz/ab12/");

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (args, stdin) = &calls[0];
        assert_eq!(args[0], "upload");
        assert_eq!(arg_after(args, "--stamp"), Some("stamp-a"));
        assert_eq!(arg_after(args, "--name"), Some("videos/seg001.ts"));
        assert_eq!(arg_after(args, "--content-type"), Some("video/mp2t"));
        assert_eq!(arg_after(args, "--bee-api-url"), Some("http://node:1633"));
        assert_eq!(arg_after(args, "-H"), Some("Authorization: Bearer tok"));
        assert_eq!(args.last().map(String::as_str), Some("--stdin"));
        assert_eq!(stdin.as_slice(), b"segment");
    }

    #[tokio::test]
    async fn test_cli_feed_manifest_replaces_separators() {
        let runner = RecordingRunner::replying(
            "URL: http://node/bzz/0000/\nFeed Manifest URL: http://node/bzz/deadbeef",
        );
        let uploader = cli(runner.clone());

        let reference = uploader
            .upload_feed_manifest(
                "videos/stream1/playlist.m3u8",
                "application/x-mpegURL",
                "feed-stamp",
                reader(b"#EXTM3U"),
                Duration::ZERO,
            )
            .await
            .unwrap();
        assert_eq!(reference, "http://node/bzz/deadbeef");

        let calls = runner.calls.lock().unwrap();
        let (args, _) = &calls[0];
        assert_eq!(&args[..2], &["feed".to_string(), "upload".to_string()]);
        assert_eq!(
            arg_after(args, "--topic-string"),
            Some("videos_stream1_playlist.m3u8")
        );
        assert_eq!(arg_after(args, "--name"), Some("videos_stream1_playlist.m3u8"));
        assert_eq!(arg_after(args, "--stamp"), Some("feed-stamp"));
        assert_eq!(arg_after(args, "--identity"), Some("main"));
        assert_eq!(arg_after(args, "--password"), Some("1234"));
    }

    #[tokio::test]
    async fn test_cli_output_without_reference_is_error() {
        let runner = RecordingRunner::replying("Uploading... done");
        let uploader = cli(runner);

        let result = uploader
            .upload_feed_manifest(
                "p.m3u8",
                "application/x-mpegURL",
                "s",
                reader(b"x"),
                Duration::ZERO,
            )
            .await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
    }

    #[tokio::test]
    async fn test_cli_runner_failure_propagates() {
        let runner = Arc::new(RecordingRunner {
            fail: true,
            ..Default::default()
        });
        let uploader = cli(runner);

        let result = uploader
            .upload_file("a.ts", "video/mp2t", "s", reader(b"x"), Duration::ZERO)
            .await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
    }

    #[tokio::test]
    async fn test_unreadable_input_is_read_error() {
        let runner = RecordingRunner::replying("URL: http://node/bzz/ab/");
        let uploader = cli(runner.clone());

        let result = uploader
            .upload_file("a.ts", "video/mp2t", "s", Box::pin(BrokenReader), Duration::ZERO)
            .await;
        assert!(matches!(result, Err(StorageError::ReadFailed(_))));
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_api_upload_posts_bytes_with_stamp() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bytes")
            .match_header(POSTAGE_BATCH_HEADER, "stamp-a")
            .match_header("authorization", "Bearer tok")
            .with_status(201)
            .with_body(r#"{"reference":"c0ffee"}"#)
            .expect(1)
            .create_async()
            .await;

        let runner = RecordingRunner::replying("");
        let uploader = ApiUploader::new(Client::new(), server.url(), "tok", cli(runner.clone()));

        let reference = uploader
            .upload_file(
                "seg001.ts",
                "video/mp2t",
                "stamp-a",
                reader(b"segment"),
                Duration::from_secs(5),
            )
            .await
            .unwrap();

        assert_eq!(reference, "c0ffee");
        mock.assert_async().await;
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_api_upload_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bytes")
            .with_status(402)
            .with_body("batch not usable")
            .create_async()
            .await;

        let uploader = ApiUploader::new(
            Client::new(),
            server.url(),
            "tok",
            cli(RecordingRunner::replying("")),
        );

        let result = uploader
            .upload_file("seg001.ts", "video/mp2t", "stamp-a", reader(b"x"), Duration::ZERO)
            .await;
        match result {
            Err(StorageError::UploadFailed(msg)) => assert!(msg.contains("402")),
            other => panic!("expected upload failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_api_upload_empty_reference_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bytes")
            .with_status(201)
            .with_body(r#"{"reference":""}"#)
            .create_async()
            .await;

        let uploader = ApiUploader::new(
            Client::new(),
            server.url(),
            "tok",
            cli(RecordingRunner::replying("")),
        );

        let result = uploader
            .upload_file("seg001.ts", "video/mp2t", "stamp-a", reader(b"x"), Duration::ZERO)
            .await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
    }

    #[tokio::test]
    async fn test_api_feed_manifest_uses_cli() {
        let runner = RecordingRunner::replying("Feed Manifest URL: http://node/bzz/feed01");
        let uploader = ApiUploader::new(
            Client::new(),
            "http://127.0.0.1:1",
            "tok",
            cli(runner.clone()),
        );

        let reference = uploader
            .upload_feed_manifest(
                "live/index.m3u8",
                "application/x-mpegURL",
                "feed",
                reader(b"#EXTM3U"),
                Duration::ZERO,
            )
            .await
            .unwrap();

        assert_eq!(reference, "http://node/bzz/feed01");
        assert_eq!(runner.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn redacts_secrets_from_logged_arguments() {
        let args: Vec<String> = [
            "feed",
            "-H",
            "Authorization: Bearer tok",
            "--password",
            "1234",
            "--stdin",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let redacted = redact_args(&args);
        assert_eq!(redacted[2], "Authorization: <redacted>");
        assert_eq!(redacted[4], "<redacted>");
        assert_eq!(redacted[5], "--stdin");
    }

    #[test]
    fn rejects_shell_metacharacters_in_program() {
        assert!(SwarmCli::new("swarm-cli; rm -rf /").is_err());
        assert!(SwarmCli::new("").is_err());
        assert!(SwarmCli::new("/usr/local/bin/swarm-cli").is_ok());
    }

    #[cfg(unix)]
    fn shell_args(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_swarm_cli_pipes_stdin_and_combines_output() {
        let tool = SwarmCli::new("/bin/sh").unwrap();
        let script = concat!(
            "n=$(wc -c | tr -d ' '); ",
            "echo \"read $n bytes\"; ",
            "echo 'URL: http://node/bzz/ab12/' >&2",
        );

        let output = tool
            .run(&shell_args(script), b"segment".to_vec())
            .await
            .unwrap();

        assert_eq!(output, "read 7 bytes\nURL: http://node/bzz/ab12/");
        assert_eq!(parse_reference(&output, ReferencePattern::Url), "http://node/bzz/ab12/");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_swarm_cli_nonzero_exit_is_upload_error() {
        let tool = SwarmCli::new("/bin/sh").unwrap();
        let script = concat!(
            "cat >/dev/null; ",
            "echo 'URL: http://node/bzz/ab12/'; ",
            "echo 'stamp expired' >&2; exit 3",
        );

        let result = tool.run(&shell_args(script), b"segment".to_vec()).await;

        match result {
            Err(StorageError::UploadFailed(message)) => {
                assert!(message.contains("stamp expired"), "{}", message);
            }
            other => panic!("expected upload failure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_swarm_cli_missing_program_is_upload_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("swarm-cli");
        let tool = SwarmCli::new(missing.to_string_lossy().into_owned()).unwrap();

        let result = tool.run(&shell_args("true"), Vec::new()).await;

        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_swarm_cli_success_without_draining_stdin() {
        let tool = SwarmCli::new("/bin/sh").unwrap();
        let payload = vec![0u8; 4 * 1024 * 1024];

        let output = tool
            .run(&shell_args("echo 'URL: http://node/bzz/ab12/'"), payload)
            .await
            .unwrap();

        assert_eq!(output, "URL: http://node/bzz/ab12/");
    }
}
