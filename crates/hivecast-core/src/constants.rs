//! Constants shared by the storage drivers.

/// Content type used for every feed-manifest (playlist) upload.
pub const PLAYLIST_CONTENT_TYPE: &str = "application/x-mpegURL";

/// Suffix that marks a save target as a feed manifest.
pub const PLAYLIST_SUFFIX: &str = ".m3u8";

/// Header carrying the postage stamp on direct API uploads.
pub const POSTAGE_BATCH_HEADER: &str = "swarm-postage-batch-id";

/// URI scheme answered by the Swarm driver.
pub const SWARM_URI_SCHEME: &str = "bzz://";

/// Lifetime requested for bearer tokens issued by `/auth`.
pub const AUTH_TOKEN_EXPIRY_SECS: u64 = 3600;

/// Role requested for bearer tokens issued by `/auth`.
pub const AUTH_TOKEN_ROLE: &str = "maintainer";
