// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-instance pid lock: one agent per blob store per machine.

use fs2::FileExt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("another agent instance already holds the lock at {0}")]
    AlreadyRunning(PathBuf),

    #[error("failed to access lock file {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
}

/// Held for the lifetime of the agent process; released (and the lock file
/// truncated) on drop.
pub struct SingleInstanceLock {
    file: File,
    path: PathBuf,
}

impl SingleInstanceLock {
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| LockError::Io { path: path.to_path_buf(), source })?;
        }
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|source| LockError::Io { path: path.to_path_buf(), source })?;

        file.try_lock_exclusive().map_err(|_| LockError::AlreadyRunning(path.to_path_buf()))?;

        let mut file = file;
        file.set_len(0).map_err(|source| LockError::Io { path: path.to_path_buf(), source })?;
        writeln!(file, "{}", std::process::id())
            .map_err(|source| LockError::Io { path: path.to_path_buf(), source })?;

        Ok(Self { file, path: path.to_path_buf() })
    }
}

impl Drop for SingleInstanceLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
