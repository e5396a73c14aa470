// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The typed event carried from worker/daemon producers to the UI consumer.

use gridagent_core::CaseId;
use tokio::sync::oneshot;

/// A question the UI must answer before the daemon proceeds.
///
/// Carries its own reply channel rather than routing through a separate
/// request table, so a producer never has to correlate a question with a
/// later answer by id.
pub struct ConfirmTerminate {
    pub prompt: String,
    pub reply: oneshot::Sender<bool>,
}

impl std::fmt::Debug for ConfirmTerminate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmTerminate").field("prompt", &self.prompt).finish_non_exhaustive()
    }
}

/// One event on the bus.
///
/// `critical` is the only variant the consumer is required to act on by
/// terminating the process; everything else is advisory.
#[derive(Debug)]
pub enum GridEvent {
    Log(String),
    Info(String),
    Warning(String),
    /// Non-fatal failure, reported and then execution continues.
    Error(String),
    /// Fatal failure; the consumer terminates the process after display.
    Critical(String),

    ProgressMax { task: String, max: u64 },
    ProgressTick { task: String, delta: u64 },
    ProgressClose { task: String },

    /// Request-reply: Phase 1 asks whether to terminate all workers when
    /// `desired_concurrency` drops to zero while work is running.
    ConfirmTerminate(ConfirmTerminate),

    CaseAdded { case_id: CaseId },
    CaseSubmitted { case_id: CaseId },
    MyCaseAdded { case_id: CaseId },
    MyProcessAdded { case_id: CaseId },
    MyProcessRemoved { case_id: CaseId },
    MyProcessStatusChanged { case_id: CaseId, status: WorkerStatus },
}

/// Worker status as reported to the UI — distinct from [`gridagent_core::CaseStatus`],
/// which tracks the catalog record rather than the local OS process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    Processing,
    Paused,
}

impl GridEvent {
    pub fn confirm_terminate(prompt: impl Into<String>) -> (Self, oneshot::Receiver<bool>) {
        let (reply, rx) = oneshot::channel();
        (Self::ConfirmTerminate(ConfirmTerminate { prompt: prompt.into(), reply }), rx)
    }
}
