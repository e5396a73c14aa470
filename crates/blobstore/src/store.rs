// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shared filesystem tree holding zipped case payloads.
//!
//! Callers need to distinguish two very different failures: a single
//! missing blob (a case-level terminal error — the peer tree is fine, this
//! one archive is gone) versus the blob store root itself being
//! unreachable (daemon-fatal — the shared mount has disappeared).

use crate::error::BlobError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// `Cases/<user>/<host>/<id>` — the input archive for a freshly submitted case.
pub fn case_path(user: &str, host: &str, id: &str) -> String {
    format!("Cases/{user}/{host}/{id}")
}

/// `Results/<user>/<host>/<basename>` — the output archive, named after the
/// original input archive's basename so case identity survives the swap.
pub fn result_path(user: &str, host: &str, basename: &str) -> String {
    format!("Results/{user}/{host}/{basename}")
}

#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// True if the root of the shared tree itself is reachable right now.
    async fn is_reachable(&self) -> bool;

    /// Copy a local file to `relative` under the store, creating parent
    /// directories as needed.
    async fn put(&self, relative: &str, local_path: &Path) -> Result<(), BlobError>;

    /// Copy `relative` out of the store to `local_path`. Distinguishes a
    /// missing blob ([`BlobError::NotFound`]) from an unreachable root
    /// ([`BlobError::RootUnreachable`]).
    async fn get(&self, relative: &str, local_path: &Path) -> Result<(), BlobError>;

    async fn remove(&self, relative: &str) -> Result<(), BlobError>;
}

#[derive(Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn is_reachable(&self) -> bool {
        tokio::fs::metadata(&self.root).await.is_ok()
    }

    async fn put(&self, relative: &str, local_path: &Path) -> Result<(), BlobError> {
        let dest = self.resolve(relative);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(local_path, &dest).await?;
        Ok(())
    }

    async fn get(&self, relative: &str, local_path: &Path) -> Result<(), BlobError> {
        let source = self.resolve(relative);
        match tokio::fs::copy(&source, local_path).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if self.is_reachable().await {
                    Err(BlobError::NotFound(source))
                } else {
                    Err(BlobError::RootUnreachable(self.root.clone(), e))
                }
            }
            Err(e) => Err(BlobError::Io(e)),
        }
    }

    async fn remove(&self, relative: &str) -> Result<(), BlobError> {
        let path = self.resolve(relative);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BlobError::Io(e)),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::Arc;

    /// In-memory blob store for tests. Tracks which relative paths "exist"
    /// and a reachability flag a test can flip to simulate the shared
    /// mount disappearing.
    #[derive(Clone, Default)]
    pub struct FakeBlobStore {
        inner: Arc<Mutex<FakeState>>,
    }

    #[derive(Default)]
    struct FakeState {
        present: HashSet<String>,
        reachable: bool,
    }

    impl FakeBlobStore {
        pub fn new() -> Self {
            Self { inner: Arc::new(Mutex::new(FakeState { present: HashSet::new(), reachable: true })) }
        }

        pub fn set_reachable(&self, reachable: bool) {
            self.inner.lock().reachable = reachable;
        }

        pub fn contains(&self, relative: &str) -> bool {
            self.inner.lock().present.contains(relative)
        }
    }

    #[async_trait]
    impl BlobStore for FakeBlobStore {
        async fn is_reachable(&self) -> bool {
            self.inner.lock().reachable
        }

        async fn put(&self, relative: &str, _local_path: &Path) -> Result<(), BlobError> {
            self.inner.lock().present.insert(relative.to_string());
            Ok(())
        }

        async fn get(&self, relative: &str, local_path: &Path) -> Result<(), BlobError> {
            let state = self.inner.lock();
            if !state.present.contains(relative) {
                return if state.reachable {
                    Err(BlobError::NotFound(PathBuf::from(relative)))
                } else {
                    Err(BlobError::RootUnreachable(
                        PathBuf::from("<fake root>"),
                        std::io::Error::from(std::io::ErrorKind::NotFound),
                    ))
                };
            }
            drop(state);
            tokio::fs::write(local_path, b"fake-archive").await?;
            Ok(())
        }

        async fn remove(&self, relative: &str) -> Result<(), BlobError> {
            self.inner.lock().present.remove(relative);
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeBlobStore;

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
