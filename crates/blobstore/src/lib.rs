// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gridagent-blobstore: the shared-filesystem archive tree and its
//! deflate-packed archive format.

mod error;
mod packer;
mod store;

pub use error::{BlobError, PackError, UnpackError};
pub use packer::{pack, unpack};
pub use store::{case_path, result_path, BlobStore, LocalBlobStore};

#[cfg(any(test, feature = "test-support"))]
pub use store::FakeBlobStore;
