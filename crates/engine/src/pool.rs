// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The processing daemon: the claim-run-report loop, the reclaim-stalled-case
//! loop, retry accounting, and the worker-pool capacity controller. Every
//! `daemon_pause` it runs, in order, pool reconciliation (§4.G Phase 1),
//! local liveness / folded-in heartbeats (Phase 2), then case acquisition
//! (Phase 3).

use crate::error::WorkerError;
use crate::spawner::WorkerSpawner;
use chrono::{DateTime, Utc};
use gridagent_catalog::CatalogClient;
use gridagent_core::{Attempt, CaseId, CaseRecord, TimingConfig};
use gridagent_eventbus::{EventBus, GridEvent, WorkerStatus};
use indexmap::{IndexMap, IndexSet};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::process::Child;
use tokio_util::sync::CancellationToken;

struct WorkerSlot {
    child: Child,
    last_heartbeat_sent: DateTime<Utc>,
}

/// Shared with the UI: the user-controlled worker-pool size. Writes are
/// UI-only; the daemon only ever reads it.
#[derive(Clone, Default)]
pub struct DesiredConcurrency(Arc<AtomicU32>);

impl DesiredConcurrency {
    pub fn new(initial: u32) -> Self {
        Self(Arc::new(AtomicU32::new(initial)))
    }

    pub fn set(&self, value: u32) {
        self.0.store(value, Ordering::Relaxed);
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct ProcessingDaemon<C: CatalogClient, S: WorkerSpawner> {
    catalog: C,
    spawner: S,
    bus: EventBus,
    timing: TimingConfig,
    user_group: String,
    instance: String,
    user: String,
    machine: String,
    possible_apps: Vec<String>,
    scratch_root: PathBuf,
    desired: DesiredConcurrency,
    alive: IndexMap<CaseId, WorkerSlot>,
    paused: IndexSet<CaseId>,
    last_access_no_case: Option<DateTime<Utc>>,
}

impl<C: CatalogClient, S: WorkerSpawner> ProcessingDaemon<C, S> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: C,
        spawner: S,
        bus: EventBus,
        timing: TimingConfig,
        user_group: impl Into<String>,
        instance: impl Into<String>,
        user: impl Into<String>,
        machine: impl Into<String>,
        possible_apps: Vec<String>,
        scratch_root: impl Into<PathBuf>,
        desired: DesiredConcurrency,
    ) -> Self {
        Self {
            catalog,
            spawner,
            bus,
            timing,
            user_group: user_group.into(),
            instance: instance.into(),
            user: user.into(),
            machine: machine.into(),
            possible_apps,
            scratch_root: scratch_root.into(),
            desired,
            alive: IndexMap::new(),
            paused: IndexSet::new(),
            last_access_no_case: None,
        }
    }

    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }

    pub fn paused_count(&self) -> usize {
        self.paused.len()
    }

    /// Run Phases 1-3 once.
    pub async fn tick(&mut self) -> Result<(), WorkerError> {
        self.phase1_reconcile().await;
        self.phase2_liveness().await?;
        self.phase3_acquire().await?;
        Ok(())
    }

    /// Run the supervisory loop until `cancel` fires, then terminate
    /// in-flight workers with a 1-second grace.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), WorkerError> {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.timing.daemon_pause) => {}
            }
            self.tick().await?;
        }
        self.shutdown().await;
        Ok(())
    }

    async fn shutdown(&mut self) {
        for (case_id, mut slot) in std::mem::take(&mut self.alive) {
            if tokio::time::timeout(std::time::Duration::from_secs(1), slot.child.wait()).await.is_err() {
                let _ = slot.child.kill().await;
            }
            self.bus.send(GridEvent::MyProcessRemoved { case_id });
        }
        self.paused.clear();
    }

    async fn phase1_reconcile(&mut self) {
        let desired = self.desired.get() as usize;
        let total = self.alive.len();

        if desired == 0 && total > 0 {
            self.confirm_terminate_all().await;
            return;
        }

        let running = total - self.paused.len();
        if desired < running {
            self.suspend(running - desired).await;
        } else if desired > running && !self.paused.is_empty() {
            self.resume((desired - running).min(self.paused.len())).await;
        }
    }

    async fn confirm_terminate_all(&mut self) {
        let (event, reply) = GridEvent::confirm_terminate(
            "reduce worker pool to zero while cases are in flight — terminate them now?",
        );
        self.bus.send(event);
        let confirmed = reply.await.unwrap_or(false);

        if confirmed {
            for (case_id, mut slot) in std::mem::take(&mut self.alive) {
                let _ = slot.child.kill().await;
                self.bus.send(GridEvent::MyProcessRemoved { case_id });
            }
            self.paused.clear();
        } else {
            // The user may not drop to zero workers with cases running
            // without explicit approval.
            self.desired.set(1);
        }
    }

    async fn suspend(&mut self, count: usize) {
        let targets: Vec<CaseId> =
            self.alive.keys().filter(|id| !self.paused.contains(*id)).take(count).copied().collect();
        for case_id in targets {
            if let Some(slot) = self.alive.get(&case_id) {
                signal_child(&slot.child, Signal::SIGSTOP);
            }
            self.paused.insert(case_id);
            self.bus.send(GridEvent::MyProcessStatusChanged { case_id, status: WorkerStatus::Paused });
        }
    }

    async fn resume(&mut self, count: usize) {
        let targets: Vec<CaseId> = self.paused.iter().take(count).copied().collect();
        for case_id in targets {
            if let Some(slot) = self.alive.get(&case_id) {
                signal_child(&slot.child, Signal::SIGCONT);
            }
            self.paused.shift_remove(&case_id);
            self.bus.send(GridEvent::MyProcessStatusChanged { case_id, status: WorkerStatus::Processing });
        }
    }

    async fn phase2_liveness(&mut self) -> Result<(), WorkerError> {
        let now = Utc::now();
        let heartbeat_every = chrono_duration(self.timing.db_heartbeat_frequency);
        let mut dead = Vec::new();

        for (case_id, slot) in self.alive.iter_mut() {
            match slot.child.try_wait() {
                Ok(Some(_status)) => dead.push(*case_id),
                Ok(None) => {
                    if now - slot.last_heartbeat_sent > heartbeat_every {
                        self.catalog.heartbeat(case_id, now).await?;
                        slot.last_heartbeat_sent = now;
                    }
                }
                Err(_) => dead.push(*case_id),
            }
        }

        for case_id in dead {
            self.alive.shift_remove(&case_id);
            self.paused.shift_remove(&case_id);
            self.bus.send(GridEvent::MyProcessRemoved { case_id });
        }
        Ok(())
    }

    async fn phase3_acquire(&mut self) -> Result<(), WorkerError> {
        let desired = self.desired.get() as usize;
        if desired <= self.alive.len() {
            return Ok(());
        }

        let now = Utc::now();
        if let Some(last) = self.last_access_no_case {
            if now - last < chrono_duration(self.timing.db_connect_frequency) {
                return Ok(());
            }
        }

        let claimant = Attempt::new(&self.user, &self.machine);
        while self.alive.len() < desired {
            let claimed = match self
                .catalog
                .claim_stalled(
                    &self.user_group,
                    &self.instance,
                    &self.possible_apps,
                    &claimant,
                    self.timing.db_heartbeat_dead_chrono(),
                    now,
                )
                .await?
            {
                Some(case) => Some(case),
                None => {
                    self.catalog
                        .claim_new(&self.user_group, &self.instance, &self.possible_apps, &claimant, now)
                        .await?
                }
            };

            let Some(case) = claimed else {
                self.last_access_no_case = Some(now);
                break;
            };

            if case.processors.attempt_count() >= self.timing.max_attempts as usize {
                self.catalog
                    .record_attempt_failure(&case.id, "case failed to process already 3 times", now)
                    .await?;
                continue;
            }

            self.spawn_worker(case).await?;
        }
        Ok(())
    }

    async fn spawn_worker(&mut self, case: CaseRecord) -> Result<(), WorkerError> {
        let scratch_dir = self.scratch_root.join(case.id.to_string());
        tokio::fs::create_dir_all(&scratch_dir).await?;
        let child = self.spawner.spawn(&case.id, &scratch_dir).await?;
        self.alive.insert(case.id, WorkerSlot { child, last_heartbeat_sent: Utc::now() });
        self.bus.send(GridEvent::MyProcessAdded { case_id: case.id });
        Ok(())
    }
}

fn signal_child(child: &Child, signal: Signal) {
    if let Some(pid) = child.id() {
        if let Err(err) = kill(Pid::from_raw(pid as i32), signal) {
            tracing::warn!(?signal, pid, %err, "failed to signal worker");
        }
    }
}

fn chrono_duration(std_duration: std::time::Duration) -> chrono::Duration {
    chrono::Duration::from_std(std_duration).unwrap_or(chrono::Duration::zero())
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
