//! Swarm storage backend
//!
//! Segments are uploaded as immutable content under the content stamp; playlists
//! are published to a feed under the feed stamp so that a single manifest URL
//! always resolves to the latest version.

pub mod auth;
pub mod client;
pub mod driver;
pub mod reference;
pub mod session;

pub use auth::{authenticate, TokenCache};
pub use client::{ApiUploader, CliUploader, CommandRunner, SwarmCli, SwarmUploader};
pub use driver::{Credentials, StampInfo, SwarmDriver, SwarmDriverBuilder};
pub use reference::{parse_feed_manifest_url, parse_reference, parse_url, ReferencePattern};
pub use session::SwarmSession;
