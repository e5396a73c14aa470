// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single-case worker pipeline run inside each worker process: resolve
//! the input archive, unpack it, invoke the application's `process` plug-in,
//! pack the outputs, and commit the result.

use crate::error::WorkerError;
use chrono::Utc;
use gridagent_blobstore::{pack, result_path, unpack, BlobError, BlobStore};
use gridagent_catalog::CatalogClient;
use gridagent_core::{CaseId, CaseRecord};
use gridagent_eventbus::{EventBus, GridEvent};
use gridagent_plugin::PluginTrampoline;
use std::path::Path;

/// What happened to a case after one worker pipeline run — used by the
/// caller (the processing daemon's pool) to decide whether the worker
/// remains `alive` or should be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// Committed `processed`; the worker's job is done.
    Processed,
    /// Marked terminal (missing input); the worker's job is done.
    TerminalError,
    /// The blob store root vanished; daemon-fatal, caller should emit
    /// `critical` and stop acquiring new work.
    BlobStoreUnreachable,
    /// The plug-in raised a contract error; the case is left `processing`
    /// for a peer to reclaim after the heartbeat expires.
    PluginFailed,
}

/// Run the §4.G.1 pipeline for one already-claimed `case`.
pub async fn run_case<C: CatalogClient, B: BlobStore>(
    catalog: &C,
    blobs: &B,
    plugins: &PluginTrampoline,
    scratch_root: &Path,
    case: &CaseRecord,
    bus: &EventBus,
) -> Result<WorkerOutcome, WorkerError> {
    let scratch = tempfile::tempdir_in(scratch_root).map_err(gridagent_blobstore::PackError::Write)?;
    let local_archive = scratch.path().join("input.zip");

    match blobs.get(&case.path, &local_archive).await {
        Ok(()) => {}
        Err(BlobError::NotFound(_)) => {
            catalog.mark_error(&case.id, "file input not found", Utc::now()).await?;
            bus.send(GridEvent::Error(format!("case {}: input archive missing", case.id)));
            return Ok(WorkerOutcome::TerminalError);
        }
        Err(BlobError::RootUnreachable(root, source)) => {
            bus.send(GridEvent::Critical(format!("blob store root {} unreachable: {source}", root.display())));
            return Ok(WorkerOutcome::BlobStoreUnreachable);
        }
        Err(other) => return Err(other.into()),
    }

    let ordered_inputs = unpack(&local_archive, scratch.path())?;
    // The scratch directory is removed wholesale on drop; this just matches
    // §4.B's "archive is deleted before the plug-in is invoked" contract.
    let _ = std::fs::remove_file(&local_archive);

    let ordered_outputs = match plugins.process_case(&case.application, &ordered_inputs).await {
        Ok(outputs) => outputs,
        Err(err) => {
            // Left `processing`: the heartbeat will expire and a peer
            // reclaims, bounded by the attempt ceiling (Phase 3).
            bus.send(GridEvent::Error(format!("case {}: process_case failed: {err}", case.id)));
            return Ok(WorkerOutcome::PluginFailed);
        }
    };

    let output_archive = scratch.path().join("output.zip");
    pack(&ordered_outputs, &output_archive)?;

    let basename = basename_of(&case.id, &case.path);
    let relative = result_path(&case.origin.user, &case.origin.machine, &basename);
    blobs.put(&relative, &output_archive).await?;

    catalog.commit_processed(&case.id, &relative, Utc::now()).await?;
    blobs.remove(&case.path).await?;
    bus.send(GridEvent::MyProcessRemoved { case_id: case.id });

    Ok(WorkerOutcome::Processed)
}

/// The output archive reuses the input archive's basename so the two halves
/// of a case share an identifiable filename under `Cases/`/`Results/`.
fn basename_of(id: &CaseId, path: &str) -> String {
    Path::new(path).file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| id.to_string())
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
