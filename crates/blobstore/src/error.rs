// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("input path does not exist: {0}")]
    MissingInput(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, #[source] source: std::io::Error },

    #[error("failed to write archive: {0}")]
    Write(#[source] std::io::Error),

    #[error("zip encoding failed: {0}")]
    Zip(#[from] zip::result::ZipError),
}

#[derive(Debug, Error)]
pub enum UnpackError {
    #[error("archive not found: {0}")]
    MissingArchive(PathBuf),

    #[error("failed to open archive: {0}")]
    Open(#[source] std::io::Error),

    #[error("zip decoding failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("archive entry has no `<index>_` prefix: {0}")]
    MissingIndexPrefix(String),

    #[error("archive entry index is not an integer: {0}")]
    InvalidIndex(String),

    #[error("failed to write unpacked entry {path}: {source}")]
    Write { path: PathBuf, #[source] source: std::io::Error },
}

/// Errors surfaced by the blob store itself, as distinct from the pack/unpack
/// codec — used when locating or removing archives under `Cases/`/`Results/`.
#[derive(Debug, Error)]
pub enum BlobError {
    /// The blob store root is unreachable (e.g. the shared mount has
    /// disappeared) — distinct from a single missing file, which is a
    /// case-level terminal error rather than a daemon-fatal one.
    #[error("blob store root {0} is unreachable: {1}")]
    RootUnreachable(PathBuf, #[source] std::io::Error),

    #[error("blob at {0} not found")]
    NotFound(PathBuf),

    #[error(transparent)]
    Pack(#[from] PackError),

    #[error(transparent)]
    Unpack(#[from] UnpackError),

    #[error("filesystem operation failed: {0}")]
    Io(#[from] std::io::Error),
}
