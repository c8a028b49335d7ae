//! Save-target classification and content-type lookup.

use hivecast_core::constants::{PLAYLIST_CONTENT_TYPE, PLAYLIST_SUFFIX};

/// Fallback for names without a known extension.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// How a save target is uploaded, derived once from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Immutable content, e.g. a video segment.
    Segment,
    /// A playlist published through the mutable feed manifest.
    Manifest,
}

impl ContentKind {
    pub fn classify(path: &str) -> Self {
        if path.ends_with(PLAYLIST_SUFFIX) {
            ContentKind::Manifest
        } else {
            ContentKind::Segment
        }
    }
}

/// Extension of the last path element, without the dot.
fn extension(path: &str) -> Option<&str> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    match file_name.rfind('.') {
        Some(idx) if idx + 1 < file_name.len() => Some(&file_name[idx + 1..]),
        _ => None,
    }
}

/// Resolve a MIME type from the extension of `path`.
pub fn content_type_for_path(path: &str) -> &'static str {
    let Some(ext) = extension(path) else {
        return DEFAULT_CONTENT_TYPE;
    };

    match ext.to_lowercase().as_str() {
        "ts" => "video/mp2t",
        "m3u8" => PLAYLIST_CONTENT_TYPE,
        "mp4" | "m4s" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "m4a" | "aac" => "audio/mp4",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "json" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "vtt" => "text/vtt",
        "html" | "htm" => "text/html; charset=utf-8",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
