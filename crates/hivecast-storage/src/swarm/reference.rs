//! Extraction of references from the external tool's text output.

use regex::Regex;
use std::sync::LazyLock;

static FEED_MANIFEST_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Feed Manifest URL: (https?://\S+)").expect("static regex is valid")
});

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"URL: (https?://\S+)").expect("static regex is valid"));

/// Which reference line to look for.
///
/// The patterns are not interchangeable: feed uploads print an ordinary `URL:`
/// line next to the manifest line in some tool versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferencePattern {
    /// `Feed Manifest URL: <url>`, printed by `feed upload`.
    FeedManifest,
    /// `URL: <url>`, printed by `upload`.
    Url,
}

impl ReferencePattern {
    fn regex(self) -> &'static Regex {
        match self {
            ReferencePattern::FeedManifest => &FEED_MANIFEST_URL,
            ReferencePattern::Url => &URL,
        }
    }
}

/// Return the first reference matching `pattern`, or an empty string.
///
/// Callers must treat the empty string as a failure.
pub fn parse_reference(output: &str, pattern: ReferencePattern) -> String {
    pattern
        .regex()
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

pub fn parse_feed_manifest_url(output: &str) -> String {
    parse_reference(output, ReferencePattern::FeedManifest)
}

pub fn parse_url(output: &str) -> String {
    parse_reference(output, ReferencePattern::Url)
}

/// Strip a retrieval URL (`http://node/bzz/<ref>/`) down to the reference.
///
/// Bare references are returned unchanged.
pub fn reference_from_url(value: &str) -> &str {
    let value = value.trim();
    match value.find("/bzz/") {
        Some(idx) => value[idx + "/bzz/".len()..].trim_end_matches('/'),
        None => value.trim_matches('/'),
    }
}
