//! Request path mapping
//!
//! Maps a URI path onto the filesystem below the root and back again.

use std::path::{Component, Path, PathBuf};

/// Map a request URI path to a filesystem path under `root`
///
/// The path is percent-decoded and split on `/`. Empty and `.` segments
/// are dropped; a `..` segment, a NUL byte or invalid UTF-8 yields `None`
/// so nothing outside `root` is ever addressed. An empty path maps to
/// `root` itself.
pub fn resolve_target(root: &Path, request_path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(request_path).ok()?;

    let mut target = root.to_path_buf();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            s if s.contains('\0') || (cfg!(windows) && s.contains('\\')) => return None,
            s => target.push(s),
        }
    }
    Some(target)
}

/// Path of `path` relative to `root`, `/`-joined without a leading slash
///
/// Returns an empty string for `root` itself and `None` when `path` is not
/// below `root`.
pub fn root_relative(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

/// Root-relative URL of a directory, always with leading and trailing `/`
pub fn directory_url(relative: &str) -> String {
    if relative.is_empty() {
        "/".to_string()
    } else {
        format!("/{relative}/")
    }
}

/// Root-relative URL of a file
pub fn file_url(relative: &str) -> String {
    format!("/{relative}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_is_root() {
        let root = Path::new("/srv/public_html");
        assert_eq!(resolve_target(root, "/"), Some(root.to_path_buf()));
        assert_eq!(resolve_target(root, ""), Some(root.to_path_buf()));
    }

    #[test]
    fn test_nested_path() {
        let root = Path::new("/srv/public_html");
        assert_eq!(
            resolve_target(root, "/docs/./guide.txt"),
            Some(root.join("docs").join("guide.txt"))
        );
        assert_eq!(resolve_target(root, "//docs//"), Some(root.join("docs")));
    }

    #[test]
    fn test_percent_decoding() {
        let root = Path::new("/srv/public_html");
        assert_eq!(
            resolve_target(root, "/my%20file.txt"),
            Some(root.join("my file.txt"))
        );
    }

    #[test]
    fn test_parent_segments_rejected() {
        let root = Path::new("/srv/public_html");
        assert_eq!(resolve_target(root, "/../etc/passwd"), None);
        assert_eq!(resolve_target(root, "/docs/../../etc/passwd"), None);
        assert_eq!(resolve_target(root, "/%2e%2e/etc/passwd"), None);
        assert_eq!(resolve_target(root, "/docs%2F..%2F..%2Fsecret"), None);
        assert_eq!(resolve_target(root, "/bad%00name"), None);
    }

    #[test]
    fn test_root_relative() {
        let root = Path::new("/srv/public_html");
        assert_eq!(root_relative(root, root).as_deref(), Some(""));
        assert_eq!(
            root_relative(root, &root.join("a").join("b.txt")).as_deref(),
            Some("a/b.txt")
        );
        assert_eq!(root_relative(root, Path::new("/etc")), None);
    }

    #[test]
    fn test_urls() {
        assert_eq!(directory_url(""), "/");
        assert_eq!(directory_url("a/b"), "/a/b/");
        assert_eq!(file_url("a/b.txt"), "/a/b.txt");
    }
}
