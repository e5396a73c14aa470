// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pack an ordered list of file/directory inputs into a single deflate
//! archive and reverse the operation with ordering recovered.
//!
//! Each top-level entry is stored under `<index>_<basename>` so that
//! [`unpack`] can recover the original order (and names) by stripping the
//! prefix and sorting by the parsed index. Directories are walked
//! recursively; empty subdirectories get an explicit zero-length entry so
//! they survive the round trip.

use crate::error::{PackError, UnpackError};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

fn file_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Pack `inputs`, in order, into a new archive at `archive_path`.
pub fn pack(inputs: &[PathBuf], archive_path: &Path) -> Result<(), PackError> {
    let file = File::create(archive_path).map_err(PackError::Write)?;
    let mut zip = ZipWriter::new(file);
    let options = file_options();

    for (index, input) in inputs.iter().enumerate() {
        if !input.exists() {
            return Err(PackError::MissingInput(input.clone()));
        }
        let basename = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| index.to_string());
        let prefix = format!("{index}_{basename}");

        if input.is_dir() {
            pack_dir(&mut zip, input, &prefix, options)?;
        } else {
            pack_file(&mut zip, input, &prefix, options)?;
        }
    }

    zip.finish()?;
    Ok(())
}

fn pack_file<W: io::Write + io::Seek>(
    zip: &mut ZipWriter<W>,
    path: &Path,
    name: &str,
    options: SimpleFileOptions,
) -> Result<(), PackError> {
    zip.start_file(name, options)?;
    let mut source = File::open(path).map_err(|source| PackError::Read { path: path.to_path_buf(), source })?;
    io::copy(&mut source, zip).map_err(PackError::Write)?;
    Ok(())
}

fn pack_dir<W: io::Write + io::Seek>(
    zip: &mut ZipWriter<W>,
    root: &Path,
    prefix: &str,
    options: SimpleFileOptions,
) -> Result<(), PackError> {
    // A bare directory entry for the root itself, so an empty input
    // directory still produces one entry.
    zip.add_directory(format!("{prefix}/"), options)?;

    for entry in walkdir::WalkDir::new(root).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            let source = e.into_io_error().unwrap_or_else(|| io::Error::other("directory walk failed"));
            PackError::Read { path, source }
        })?;
        let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let name = format!("{prefix}/{}", rel.to_string_lossy());

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{name}/"), options)?;
        } else {
            pack_file(zip, entry.path(), &name, options)?;
        }
    }
    Ok(())
}

/// Unpack `archive_path` into `dest_dir`, returning the recovered inputs in
/// their original order (each a path under `dest_dir`).
pub fn unpack(archive_path: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>, UnpackError> {
    if !archive_path.exists() {
        return Err(UnpackError::MissingArchive(archive_path.to_path_buf()));
    }
    let file = File::open(archive_path).map_err(UnpackError::Open)?;
    let mut archive = ZipArchive::new(file)?;

    // index -> recovered top-level path under dest_dir
    let mut recovered: Vec<(usize, PathBuf)> = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let entry_name = entry.name().to_string();
        let (index, rest) = split_index_prefix(&entry_name)?;

        let stripped = rest.strip_prefix('/').unwrap_or(rest);
        let dest_path = dest_dir.join(stripped);

        if entry.is_dir() {
            std::fs::create_dir_all(&dest_path)
                .map_err(|source| UnpackError::Write { path: dest_path.clone(), source })?;
        } else {
            if let Some(parent) = dest_path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|source| UnpackError::Write { path: dest_path.clone(), source })?;
            }
            let mut out = File::create(&dest_path)
                .map_err(|source| UnpackError::Write { path: dest_path.clone(), source })?;
            io::copy(&mut entry, &mut out)
                .map_err(|source| UnpackError::Write { path: dest_path.clone(), source })?;
        }

        // The top-level recovered path is dest_dir/<index>_<basename>,
        // i.e. the first path component after dest_dir.
        if let Some(top) = stripped.split('/').next() {
            let top_path = dest_dir.join(top);
            if !recovered.iter().any(|(idx, _)| *idx == index) {
                recovered.push((index, top_path));
            }
        }
    }

    recovered.sort_by_key(|(index, _)| *index);
    Ok(recovered.into_iter().map(|(_, path)| path).collect())
}

fn split_index_prefix(entry_name: &str) -> Result<(usize, &str), UnpackError> {
    let top = entry_name.split('/').next().unwrap_or(entry_name);
    let (index_str, _) = top
        .split_once('_')
        .ok_or_else(|| UnpackError::MissingIndexPrefix(entry_name.to_string()))?;
    let index: usize =
        index_str.parse().map_err(|_| UnpackError::InvalidIndex(entry_name.to_string()))?;
    let rest = &entry_name[index_str.len() + 1..];
    Ok((index, rest))
}

#[cfg(test)]
#[path = "packer_tests.rs"]
mod tests;
