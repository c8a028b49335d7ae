use anyhow::Context;
use futures::StreamExt;
use hivecast_storage::traits::{ByteStream, DataReader};
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Whether logs are emitted as JSON lines.
///
/// An explicit `HIVECAST_LOG_FORMAT` (`json` or `text`) wins; otherwise production
/// deployments log JSON.
pub fn json_logs(production: bool, format: Option<&str>) -> bool {
    match format.map(|f| f.trim().to_lowercase()) {
        Some(f) if f == "json" => true,
        Some(f) if f == "text" || f == "pretty" => false,
        _ => production,
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing(production: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let format = std::env::var("HIVECAST_LOG_FORMAT").ok();

    if json_logs(production, format.as_deref()) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Open `path` for upload and pick the object name (`name`, or the file name).
pub async fn open_input(path: &Path, name: Option<&str>) -> anyhow::Result<(String, DataReader)> {
    let object_name = match name {
        Some(name) => name.to_string(),
        None => path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .with_context(|| format!("Cannot derive an object name from {}", path.display()))?,
    };

    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Open {}", path.display()))?;

    let reader: DataReader = Box::pin(file);
    Ok((object_name, reader))
}

/// Drain a download stream into `out`, returning the number of bytes written.
pub async fn copy_stream<W>(mut body: ByteStream, out: &mut W) -> anyhow::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.context("Download interrupted")?;
        out.write_all(&chunk).await.context("Write output")?;
        written += chunk.len() as u64;
    }
    out.flush().await.context("Flush output")?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use hivecast_storage::StorageError;
    use tokio::io::AsyncReadExt;

    fn chunks(parts: Vec<Result<&'static [u8], StorageError>>) -> ByteStream {
        let items: Vec<Result<Bytes, StorageError>> = parts
            .into_iter()
            .map(|p| p.map(Bytes::from_static))
            .collect();
        Box::pin(futures::stream::iter(items))
    }

    #[test]
    fn json_logs_follow_environment_unless_overridden() {
        assert!(json_logs(true, None));
        assert!(!json_logs(false, None));
        assert!(json_logs(false, Some("JSON")));
        assert!(!json_logs(true, Some("text")));
        assert!(json_logs(true, Some("unknown")));
    }

    #[tokio::test]
    async fn open_input_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seg001.ts");
        std::fs::write(&path, b"segment").unwrap();

        let (name, mut reader) = open_input(&path, None).await.unwrap();
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await.unwrap();

        assert_eq!(name, "seg001.ts");
        assert_eq!(data, b"segment");
    }

    #[tokio::test]
    async fn open_input_prefers_explicit_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.m3u8");
        std::fs::write(&path, b"#EXTM3U").unwrap();

        let (name, _) = open_input(&path, Some("stream1/index.m3u8")).await.unwrap();
        assert_eq!(name, "stream1/index.m3u8");
    }

    #[tokio::test]
    async fn open_input_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open_input(&dir.path().join("absent.ts"), None).await.is_err());
    }

    #[tokio::test]
    async fn copy_stream_writes_all_chunks() {
        let mut out = Vec::new();
        let written = copy_stream(chunks(vec![Ok(&b"abc"[..]), Ok(&b"def"[..])]), &mut out)
            .await
            .unwrap();

        assert_eq!(written, 6);
        assert_eq!(out, b"abcdef");
    }

    #[tokio::test]
    async fn copy_stream_surfaces_download_errors() {
        let mut out = Vec::new();
        let result = copy_stream(
            chunks(vec![
                Ok(&b"abc"[..]),
                Err(StorageError::DownloadFailed("reset".to_string())),
            ]),
            &mut out,
        )
        .await;

        assert!(result.is_err());
    }
}
