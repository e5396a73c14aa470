// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gridagent-engine: the submission pipeline, the single-case worker
//! pipeline, and the two long-running daemons built on top of them — the
//! processing daemon's worker-pool supervisor and the receiving daemon.

mod error;
mod pool;
mod receiving;
mod spawner;
mod submission;
mod worker;

pub use error::WorkerError;
pub use pool::{DesiredConcurrency, ProcessingDaemon};
pub use receiving::{ReceivingDaemon, StopReason};
pub use spawner::{ReexecSpawner, WorkerSpawner};
pub use submission::SubmissionPipeline;
pub use worker::{run_case, WorkerOutcome};
