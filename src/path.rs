//! Composition helpers for absolute, slash-separated remote paths.
//!
//! Pure string manipulation, no remote calls. The root path is `/`.

/// Normalizes to an absolute path without a trailing slash (except root).
pub fn normalize(path: &str) -> String {
    let mut out = String::from("/");

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(segment);
    }

    out
}

/// Resolves `relative` against the absolute `base`.
pub fn join(base: &str, relative: &str) -> String {
    normalize(&format!("{base}/{relative}"))
}

/// Parent of an absolute path. The parent of the root is the root itself.
pub fn parent(path: &str) -> String {
    let normalized = normalize(path);
    match normalized.rfind('/') {
        Some(0) | None => String::from("/"),
        Some(index) => normalized[..index].to_owned(),
    }
}

/// Final segment of the path; empty for the root.
pub fn base_name(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_to_absolute() {
        assert_eq!(normalize("a/b"), "/a/b");
        assert_eq!(normalize("/a/b/"), "/a/b");
        assert_eq!(normalize("//a///b"), "/a/b");
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/"), "/");
    }

    #[test]
    fn joins_relative_segments() {
        assert_eq!(join("/a", "b/c"), "/a/b/c");
        assert_eq!(join("/", "a"), "/a");
        assert_eq!(join("/a/", "/b"), "/a/b");
    }

    #[test]
    fn parent_walks_up() {
        assert_eq!(parent("/a/b/c"), "/a/b");
        assert_eq!(parent("/a"), "/");
        assert_eq!(parent("/"), "/");
    }

    #[test]
    fn base_name_is_final_segment() {
        assert_eq!(base_name("/a/b/c.txt"), "c.txt");
        assert_eq!(base_name("/a/"), "a");
        assert_eq!(base_name("/"), "");
    }
}
