//! Uploaded file creation
//!
//! Existing files are never overwritten; an upload to a path that already
//! holds a file is reported as unchanged.

use super::root::{is_dir, is_file};
use crate::error::{Result, ServeError};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// What an upload did to the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// A file was already there and was left untouched
    Unchanged,
    /// The file was created with the request body
    Created,
}

/// Create any missing ancestors of `target`
///
/// Concurrent creation of the same directories is not an error.
pub async fn ensure_parent(target: &Path) -> Result<()> {
    let Some(parent) = target.parent() else {
        return Ok(());
    };
    if !is_dir(parent).await {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ServeError::io(parent, e))?;
    }
    Ok(())
}

/// Whether an upload to `target` would be a no-op
pub async fn already_uploaded(target: &Path) -> bool {
    is_file(target).await
}

/// Write `data` to a new file at `target`
///
/// The file is opened with `create_new`, so when another request created it
/// first this returns `Unchanged` instead of clobbering it. A partially
/// written file is removed if the write fails.
pub async fn write_new_file(target: &Path, data: &[u8]) -> Result<UploadOutcome> {
    let opened = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .await;
    let mut file = match opened {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            if is_file(target).await {
                return Ok(UploadOutcome::Unchanged);
            }
            return Err(ServeError::io(target, e));
        }
        Err(e) => return Err(ServeError::io(target, e)),
    };

    let written = async {
        file.write_all(data).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(file);
        let _ = fs::remove_file(target).await;
        return Err(ServeError::io(target, e));
    }

    Ok(UploadOutcome::Created)
}
