//! Hivecast CLI: save and read content on a Swarm node.
//!
//! Configuration comes from the environment (or `.env`): SWARM_API_URL, SWARM_STAMP,
//! SWARM_FEED_STAMP and either SWARM_API_KEY/SWARM_API_SECRET or SWARM_JWT.

use anyhow::Context;
use clap::{Parser, Subcommand};
use hivecast_cli::{copy_stream, init_tracing, open_input};
use hivecast_core::Config;
use hivecast_storage::{create_driver, ObjectSession, ObjectStoreDriver, TokenCache};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "hivecast", about = "Swarm storage CLI for hivecast")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file; playlists (.m3u8) are published to a feed
    Save {
        /// Path to the file to upload
        file: PathBuf,
        /// Session path the object name is resolved against
        #[arg(long, default_value = "")]
        base: String,
        /// Object name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
        /// Upload timeout in seconds (0 for none)
        #[arg(long, default_value = "0")]
        timeout: u64,
    },
    /// Download content by reference or bzz URL
    Read {
        /// Reference or retrieval URL
        reference: String,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show the configured node and stamps
    Info,
    /// Print the URI schemes the driver answers to
    Schemes,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env().context("Load configuration")?;
    init_tracing(config.is_production());
    let driver = create_driver(&config, Arc::new(TokenCache::new()))
        .context("Create storage driver")?;

    match cli.command {
        Commands::Save {
            file,
            base,
            name,
            timeout,
        } => {
            let (name, data) = open_input(&file, name.as_deref()).await?;
            let session = driver.new_session(&base).await?;
            let output = session
                .save_data(&name, data, None, Duration::from_secs(timeout))
                .await?;
            session.end_session();
            print_json(&output)?;
        }
        Commands::Read { reference, output } => {
            let session = driver.new_session("").await?;
            let reader = session.read_data(&reference).await?;
            let written = match output {
                Some(path) => {
                    let mut file = tokio::fs::File::create(&path)
                        .await
                        .with_context(|| format!("Create {}", path.display()))?;
                    copy_stream(reader.body, &mut file).await?
                }
                None => copy_stream(reader.body, &mut tokio::io::stdout()).await?,
            };
            tracing::info!(
                reference = %reader.file_info.name,
                size_bytes = written,
                "Read complete"
            );
        }
        Commands::Info => {
            let session = driver.new_session("").await?;
            print_json(&session.get_info())?;
        }
        Commands::Schemes => {
            print_json(&serde_json::json!({
                "description": driver.description(),
                "schemes": driver.uri_schemes(),
            }))?;
        }
    }

    Ok(())
}
