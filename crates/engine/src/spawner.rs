// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workers are real OS subprocesses, not cooperative tasks, so the
//! supervisor can suspend/resume them at the OS level (§4.G.3). Production
//! spawns re-execute the current binary as `<exe> worker --case-id <id>
//! --scratch <dir>`; tests inject a [`WorkerSpawner`] that spawns anything
//! with a pid, so pool bookkeeping can be exercised without a real worker
//! subcommand.

use async_trait::async_trait;
use gridagent_core::CaseId;
use std::path::PathBuf;
use tokio::process::{Child, Command};

#[async_trait]
pub trait WorkerSpawner: Send + Sync + 'static {
    async fn spawn(&self, case_id: &CaseId, scratch_dir: &std::path::Path) -> std::io::Result<Child>;
}

/// Re-executes the running binary with a hidden `worker` subcommand. The
/// calling binary (`gridctl`) is responsible for dispatching that
/// subcommand to [`crate::worker::run_case`].
pub struct ReexecSpawner {
    exe: PathBuf,
}

impl ReexecSpawner {
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }

    pub fn current_exe() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }
}

#[async_trait]
impl WorkerSpawner for ReexecSpawner {
    async fn spawn(&self, case_id: &CaseId, scratch_dir: &std::path::Path) -> std::io::Result<Child> {
        Command::new(&self.exe)
            .arg("worker")
            .arg("--case-id")
            .arg(case_id.to_string())
            .arg("--scratch")
            .arg(scratch_dir)
            .kill_on_drop(true)
            .spawn()
    }
}
