// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gridctl submit` — runs the submission pipeline against the bootstrap
//! config rooted at the current directory.

use crate::exit_error::ExitError;
use gridagent_blobstore::BlobStore;
use gridagent_catalog::CatalogClient;
use gridagent_engine::SubmissionPipeline;
use gridagent_eventbus::EventBus;
use gridagent_plugin::PluginTrampoline;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[allow(clippy::too_many_arguments)]
pub async fn run<C: CatalogClient, B: BlobStore>(
    catalog: C,
    blobs: B,
    plugins: PluginTrampoline,
    user_group: &str,
    instance: &str,
    user: &str,
    machine: &str,
    app: &str,
    paths: Vec<PathBuf>,
) -> Result<(), ExitError> {
    let pipeline = SubmissionPipeline::new(catalog, blobs, plugins, user_group, instance, user, machine);
    let (bus, _reader) = EventBus::new();
    let cancel = CancellationToken::new();

    let inserted = pipeline
        .submit(app, &paths, &cancel, &bus)
        .await
        .map_err(|err| ExitError::new(1, format!("submission failed: {err}")))?;

    for id in inserted {
        println!("{id}");
    }
    Ok(())
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
