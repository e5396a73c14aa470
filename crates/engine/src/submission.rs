// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The submission pipeline: expand user-selected paths into cases via the
//! application's `send` plug-in, pack each case, upload it, and insert a
//! catalog record.

use crate::error::WorkerError;
use chrono::Utc;
use gridagent_blobstore::{case_path, pack, BlobStore};
use gridagent_catalog::CatalogClient;
use gridagent_core::{zero_heartbeat, CaseId, CaseRecord, CaseStatus, Origin, Processors};
use gridagent_eventbus::{EventBus, GridEvent};
use gridagent_plugin::PluginTrampoline;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

pub struct SubmissionPipeline<C, B> {
    catalog: C,
    blobs: B,
    plugins: PluginTrampoline,
    user_group: String,
    instance: String,
    user: String,
    machine: String,
}

impl<C: CatalogClient, B: BlobStore> SubmissionPipeline<C, B> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: C,
        blobs: B,
        plugins: PluginTrampoline,
        user_group: impl Into<String>,
        instance: impl Into<String>,
        user: impl Into<String>,
        machine: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            blobs,
            plugins,
            user_group: user_group.into(),
            instance: instance.into(),
            user: user.into(),
            machine: machine.into(),
        }
    }

    /// Submit every path in `selections`, in order, as a batch for `app`.
    /// Returns the ids of the cases successfully inserted before
    /// cancellation or a fatal error interrupted the batch.
    pub async fn submit(
        &self,
        app: &str,
        selections: &[PathBuf],
        cancel: &CancellationToken,
        bus: &EventBus,
    ) -> Result<Vec<CaseId>, WorkerError> {
        let mut inserted = Vec::new();

        for selection in selections {
            if cancel.is_cancelled() {
                return Ok(inserted);
            }

            let cases = self.plugins.select_input_files(app, selection).await?;
            for inputs in cases {
                if cancel.is_cancelled() {
                    return Ok(inserted);
                }
                let id = self.submit_one(app, &inputs, bus).await?;
                inserted.push(id);
            }
        }

        Ok(inserted)
    }

    async fn submit_one(
        &self,
        app: &str,
        inputs: &[PathBuf],
        bus: &EventBus,
    ) -> Result<CaseId, WorkerError> {
        let scratch = tempfile::tempdir().map_err(gridagent_blobstore::PackError::Write)?;
        let archive = scratch.path().join("input.zip");
        pack(inputs, &archive)?;

        let id = CaseId::new();
        let relative = case_path(&self.user, &self.machine, id.as_str());
        self.blobs.put(&relative, &archive).await?;

        let input_display_path = display_path(inputs);
        let record = CaseRecord {
            id,
            user_group: self.user_group.clone(),
            instance: self.instance.clone(),
            application: app.to_string(),
            status: CaseStatus::ToProcess,
            path: relative,
            origin: Origin {
                user: self.user.clone(),
                machine: self.machine.clone(),
                input_display_path,
                submitted_at: Utc::now(),
                received_at: None,
            },
            processors: Processors::default(),
            last_heartbeat: zero_heartbeat(),
        };

        let id = self.catalog.insert_case(record).await?;
        bus.send(GridEvent::CaseSubmitted { case_id: id });
        bus.send(GridEvent::MyCaseAdded { case_id: id });
        Ok(id)
    }
}

fn display_path(inputs: &[PathBuf]) -> String {
    inputs.first().map(|p| p.to_string_lossy().into_owned()).unwrap_or_default()
}

#[cfg(test)]
#[path = "submission_tests.rs"]
mod tests;
