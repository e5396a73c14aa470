// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The receiving daemon (§4.F): a single-worker cooperative loop that polls
//! the catalog for this user's `processed` cases, downloads and unpacks the
//! output archive, invokes the `receive` plug-in, and marks the case
//! `received`. A plug-in failure is fatal to this daemon — the processing
//! daemon keeps running regardless.

use chrono::Utc;
use gridagent_blobstore::{unpack, BlobError, BlobStore};
use gridagent_catalog::CatalogClient;
use gridagent_eventbus::{EventBus, GridEvent};
use gridagent_plugin::PluginTrampoline;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct ReceivingDaemon<C, B> {
    catalog: C,
    blobs: B,
    plugins: PluginTrampoline,
    bus: EventBus,
    user_group: String,
    instance: String,
    user: String,
    machine: String,
    receivable_apps: Vec<String>,
    scratch_root: PathBuf,
    idle_interval: Duration,
    daemon_pause: Duration,
}

/// Why the receiving daemon's loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    /// A `receive` plug-in raised a contract error; fatal per §9 open
    /// question 2, matching the source's behavior exactly.
    PluginFailed,
    /// The blob store root disappeared.
    BlobStoreUnreachable,
    /// The catalog could not be reached.
    CatalogUnreachable,
}

impl<C: CatalogClient, B: BlobStore> ReceivingDaemon<C, B> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: C,
        blobs: B,
        plugins: PluginTrampoline,
        bus: EventBus,
        user_group: impl Into<String>,
        instance: impl Into<String>,
        user: impl Into<String>,
        machine: impl Into<String>,
        receivable_apps: Vec<String>,
        scratch_root: impl Into<PathBuf>,
        idle_interval: Duration,
        daemon_pause: Duration,
    ) -> Self {
        Self {
            catalog,
            blobs,
            plugins,
            bus,
            user_group: user_group.into(),
            instance: instance.into(),
            user: user.into(),
            machine: machine.into(),
            receivable_apps,
            scratch_root: scratch_root.into(),
            idle_interval,
            daemon_pause,
        }
    }

    pub async fn run(&self, cancel: &CancellationToken) -> StopReason {
        loop {
            if cancel.is_cancelled() {
                return StopReason::Cancelled;
            }
            match self.tick().await {
                Ok(true) => continue,
                Ok(false) => {
                    if self.sleep_idle(cancel).await {
                        return StopReason::Cancelled;
                    }
                }
                Err(reason) => return reason,
            }
        }
    }

    /// Run one iteration. Returns `Ok(true)` if a case was handled (so the
    /// caller should poll again immediately), `Ok(false)` if there was
    /// nothing to do.
    async fn tick(&self) -> Result<bool, StopReason> {
        let case = self
            .catalog
            .find_my_processed(&self.user_group, &self.instance, &self.user, &self.machine, &self.receivable_apps)
            .await
            .map_err(|err| {
                self.bus.send(GridEvent::Critical(format!("catalog unreachable: {err}")));
                StopReason::CatalogUnreachable
            })?;

        let Some(case) = case else {
            return Ok(false);
        };

        let scratch = tempfile::tempdir_in(&self.scratch_root).map_err(|_| StopReason::BlobStoreUnreachable)?;
        let local_archive = scratch.path().join("output.zip");

        match self.blobs.get(&case.path, &local_archive).await {
            Ok(()) => {}
            Err(BlobError::NotFound(_)) => {
                let now = Utc::now();
                let _ = self.catalog.mark_error(&case.id, "file output not found", now).await;
                self.bus.send(GridEvent::Error(format!("case {}: output archive missing", case.id)));
                return Ok(true);
            }
            Err(BlobError::RootUnreachable(root, source)) => {
                self.bus.send(GridEvent::Critical(format!(
                    "blob store root {} unreachable: {source}",
                    root.display()
                )));
                return Err(StopReason::BlobStoreUnreachable);
            }
            Err(_) => return Err(StopReason::BlobStoreUnreachable),
        }

        let ordered_outputs = unpack(&local_archive, scratch.path()).map_err(|err| {
            self.bus.send(GridEvent::Error(format!("case {}: failed to unpack results: {err}", case.id)));
            StopReason::PluginFailed
        })?;

        if let Err(err) = self.plugins.receive_case(&case.application, &ordered_outputs).await {
            self.bus.send(GridEvent::Error(format!("case {}: receive_case failed: {err}", case.id)));
            return Err(StopReason::PluginFailed);
        }

        let now = Utc::now();
        let _ = self.catalog.commit_received(&case.id, now).await;
        let _ = self.blobs.remove(&case.path).await;
        self.bus.send(GridEvent::Info(format!("case {} received", case.id)));
        Ok(true)
    }

    /// Sleeps `idle_interval`, subdivided into `daemon_pause` chunks so
    /// shutdown is observed promptly. Returns `true` if cancellation fired.
    async fn sleep_idle(&self, cancel: &CancellationToken) -> bool {
        let mut remaining = self.idle_interval;
        while !remaining.is_zero() {
            let chunk = remaining.min(self.daemon_pause);
            tokio::select! {
                _ = cancel.cancelled() => return true,
                _ = tokio::time::sleep(chunk) => {}
            }
            remaining -= chunk;
        }
        false
    }
}

#[cfg(test)]
#[path = "receiving_tests.rs"]
mod tests;
