//! Keeps a second server from writing the same data directory.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File};
use std::path::Path;

const LOCK_FILE: &str = ".server.lock";

/// Holds the lock until dropped
pub struct LockGuard {
    _file: File,
}

/// Take an exclusive lock on `data_dir`, failing if another server holds it
pub fn acquire_lock(data_dir: &Path) -> Result<LockGuard> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let path = data_dir.join(LOCK_FILE);
    let file = File::create(&path).context("Failed to create lock file")?;

    file.try_lock_exclusive().map_err(|_| {
        anyhow::anyhow!(
            "Another timetable-server is already serving {}.\n\
            If you believe this is an error, remove: {}",
            data_dir.display(),
            path.display()
        )
    })?;

    Ok(LockGuard { _file: file })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_lock_on_same_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let guard = acquire_lock(dir.path()).unwrap();
        assert!(acquire_lock(dir.path()).is_err());

        let other = tempfile::tempdir().unwrap();
        assert!(acquire_lock(other.path()).is_ok());

        drop(guard);
        assert!(acquire_lock(dir.path()).is_ok());
    }
}
