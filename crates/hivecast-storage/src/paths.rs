//! Shared path resolution for storage sessions.
//!
//! A session resolves every name against its base path with [`effective_path`].
//! The result is lexically cleaned the way a POSIX `path.Clean` would; a result
//! that collapses to the root (or to nothing) becomes the empty "no path" sentinel.

/// Lexically clean a slash-separated path.
///
/// Collapses duplicate separators, `.` elements and `..` elements (together with
/// the element preceding them). `..` at the start of a rooted path is dropped;
/// at the start of a relative path it is kept. The empty path cleans to `.`.
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Resolve `name` against a session base path.
///
/// Returns an empty string when the result is the root or the current directory.
pub fn effective_path(base_path: &str, name: &str) -> String {
    let joined = if base_path.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", base_path, name)
    };

    let cleaned = clean_path(&joined);
    if cleaned == "/" || cleaned == "." {
        String::new()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_path_matches_posix_semantics() {
        let cases = [
            ("", "."),
            ("/", "/"),
            ("a//b", "a/b"),
            ("a/./b/", "a/b"),
            ("a/b/../c", "a/c"),
            ("../a", "../a"),
            ("a/../..", ".."),
            ("/../a", "/a"),
            ("/a/b/../../..", "/"),
            ("./", "."),
        ];
        for (input, expected) in cases {
            assert_eq!(clean_path(input), expected, "clean_path({:?})", input);
        }
    }

    #[test]
    fn effective_path_without_base() {
        assert_eq!(effective_path("", "a/b.ts"), "a/b.ts");
    }

    #[test]
    fn effective_path_without_name() {
        assert_eq!(effective_path("root", ""), "root");
        assert_eq!(effective_path("videos/stream1/", ""), "videos/stream1");
    }

    #[test]
    fn effective_path_empty_is_sentinel_not_root() {
        assert_eq!(effective_path("", ""), "");
        assert_eq!(effective_path("/", ""), "");
        assert_eq!(effective_path("/videos", ".."), "");
        assert_eq!(effective_path(".", "."), "");
    }

    #[test]
    fn effective_path_collapses_traversal() {
        assert_eq!(
            effective_path("videos/stream1", "../stream2/seg001.ts"),
            "videos/stream2/seg001.ts"
        );
        assert_eq!(effective_path("/videos", "seg.ts"), "/videos/seg.ts");
    }
}
