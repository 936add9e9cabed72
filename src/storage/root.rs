//! Root directory resolution
//!
//! The served tree is `<base>/public_html` for the first configured base
//! directory where that path exists and is a directory.

use crate::config::StorageConfig;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the served directory under each candidate base
pub const PUBLIC_HTML: &str = "public_html";

/// Candidate roots in priority order: data directory first, then home
pub fn root_candidates(storage: &StorageConfig) -> impl Iterator<Item = PathBuf> + '_ {
    [storage.tool_data_dir.as_deref(), storage.home_dir.as_deref()]
        .into_iter()
        .flatten()
        .filter(|base| !base.is_empty())
        .map(|base| Path::new(base).join(PUBLIC_HTML))
}

/// Resolve the served root, or `None` when no candidate is a directory
///
/// Only the filesystem is consulted; the candidates come from configuration
/// captured at startup.
pub async fn resolve_root(storage: &StorageConfig) -> Option<PathBuf> {
    for candidate in root_candidates(storage) {
        if is_dir(&candidate).await {
            return Some(candidate);
        }
    }
    None
}

/// Whether `path` exists and is a directory (symlinks followed)
pub async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

/// Whether `path` exists and is a regular file (symlinks followed)
pub async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_file())
}
