// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use gridagent_blobstore::{BlobError, PackError, UnpackError};
use gridagent_catalog::CatalogError;
use gridagent_plugin::PluginError;
use thiserror::Error;

/// Errors raised by the worker pipeline and the submission pipeline.
///
/// Case-level terminal outcomes ("file input not found", "case failed to
/// process already 3 times") are not variants here — they are written
/// straight into the catalog and the pipeline returns `Ok(())`. This enum
/// covers only failures the pipeline could not itself turn into a catalog
/// mutation: a plug-in contract violation, a codec failure, or the catalog
/// being unreachable.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error(transparent)]
    Pack(#[from] PackError),

    #[error(transparent)]
    Unpack(#[from] UnpackError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("scratch filesystem operation failed: {0}")]
    Io(#[from] std::io::Error),
}
