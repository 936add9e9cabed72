//! Listing entries
//!
//! One `RenderablePath` per directory or regular file directly inside the
//! listed directory.

use crate::error::{Result, ServeError};
use crate::storage::target::{directory_url, file_url, root_relative};
use chrono::{DateTime, Local};
use std::fmt;
use std::path::Path;
use tokio::fs;

/// Kind of a listed entry
///
/// Ordering follows the label, so directories sort before files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryKind {
    Directory,
    File,
}

impl EntryKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Directory => "Directory",
            Self::File => "File",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderablePath {
    /// Base name of the entry
    pub name: String,
    /// Root-relative URL, with a trailing `/` for directories
    pub url: String,
    pub last_modified: DateTime<Local>,
    /// Size reported by the filesystem, not meaningful for directories
    pub size: u64,
    pub kind: EntryKind,
}

impl RenderablePath {
    /// Display order key: kind first, then name
    pub fn sort_key(&self) -> (EntryKind, &str) {
        (self.kind, self.name.as_str())
    }
}

/// List the directories and regular files directly inside `target`
///
/// Entries that are neither (dangling symlinks, sockets, ...) are skipped.
/// Kind is decided with symlinks followed; size and modification time come
/// from the entry itself. The result is sorted for display.
pub async fn scan_directory(root: &Path, target: &Path) -> Result<Vec<RenderablePath>> {
    let mut reader = fs::read_dir(target)
        .await
        .map_err(|e| ServeError::io(target, e))?;

    let mut entries = Vec::new();
    while let Some(dir_entry) = reader
        .next_entry()
        .await
        .map_err(|e| ServeError::io(target, e))?
    {
        let path = dir_entry.path();

        let kind = match fs::metadata(&path).await {
            Ok(m) if m.is_dir() => EntryKind::Directory,
            Ok(m) if m.is_file() => EntryKind::File,
            _ => continue,
        };

        let Some(relative) = root_relative(root, &path) else {
            continue;
        };

        let stat = fs::symlink_metadata(&path)
            .await
            .map_err(|e| ServeError::io(&path, e))?;
        let last_modified = stat
            .modified()
            .map(DateTime::<Local>::from)
            .map_err(|e| ServeError::io(&path, e))?;

        let url = match kind {
            EntryKind::Directory => directory_url(&relative),
            EntryKind::File => file_url(&relative),
        };

        entries.push(RenderablePath {
            name: dir_entry.file_name().to_string_lossy().into_owned(),
            url,
            last_modified,
            size: stat.len(),
            kind,
        });
    }

    entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    entries.dedup();
    Ok(entries)
}
