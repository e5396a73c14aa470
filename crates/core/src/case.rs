// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The case record — one per submitted unit of work, stored in the catalog.

use crate::status::CaseStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Opaque, catalog-assigned identifier for a case.
    ///
    /// Production code only ever receives these from the catalog (the
    /// find-and-update response); `CaseId::new()` exists for the in-memory
    /// fake catalog used in tests, which must mint its own ids.
    pub struct CaseId("case-");
}

/// One entry in `processors.attempts` — the user/machine pair that claimed
/// a case at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub user: String,
    pub machine: String,
}

impl Attempt {
    pub fn new(user: impl Into<String>, machine: impl Into<String>) -> Self {
        Self { user: user.into(), machine: machine.into() }
    }
}

/// Append-only attempt history plus the processing window's timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Processors {
    pub attempts: Vec<Attempt>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Processors {
    /// Retry count — the length of the attempt list.
    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }

    pub fn current_owner(&self) -> Option<&Attempt> {
        self.attempts.last()
    }
}

/// Where a case came from and where its results must land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub user: String,
    pub machine: String,
    pub input_display_path: String,
    pub submitted_at: DateTime<Utc>,
    pub received_at: Option<DateTime<Utc>>,
}

/// Returns the fixed "no heartbeat yet" sentinel.
///
/// Mirrors the original implementation's `datetime.datetime(1, 1, 1)`: a
/// fixed, always-comparable value rather than `Option`, since the claim
/// queries compare it directly (`last_heartbeat < now - dead_threshold`).
pub fn zero_heartbeat() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(0, 0).expect("unix epoch is representable")
}

/// One unit of work: an ordered list of input paths packaged as one
/// archive, tracked by one catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    #[serde(rename = "_id")]
    pub id: CaseId,
    pub user_group: String,
    pub instance: String,
    pub application: String,
    pub status: CaseStatus,
    /// Blob-store-relative path of the current archive. Input archive
    /// while `to process`/`processing`; output archive while `processed`;
    /// empty once `received`.
    pub path: String,
    pub origin: Origin,
    pub processors: Processors,
    pub last_heartbeat: DateTime<Utc>,
}

impl CaseRecord {
    /// Invariant 1: claimable iff `to process`, or `processing` with a
    /// heartbeat older than `dead_threshold`.
    pub fn is_claimable(&self, now: DateTime<Utc>, dead_threshold: chrono::Duration) -> bool {
        match &self.status {
            CaseStatus::ToProcess => true,
            CaseStatus::Processing => now - self.last_heartbeat > dead_threshold,
            _ => false,
        }
    }

    /// Invariant 4: terminal cases are never re-claimed.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(any(test, feature = "test-support"))]
mod builders {
    use super::*;

    crate::builder! {
        pub struct OriginBuilder => Origin {
            into {
                user: String = "tester",
                machine: String = "test-host",
                input_display_path: String = "",
            }
            computed {
                submitted_at: DateTime<Utc> = Utc::now(),
                received_at: Option<DateTime<Utc>> = None,
            }
        }
    }

    crate::builder! {
        pub struct CaseRecordBuilder => CaseRecord {
            into {
                user_group: String = "default",
                instance: String = "0",
                application: String = "RandomCounter",
                path: String = "",
            }
            set {
                id: CaseId = CaseId::new(),
                status: CaseStatus = CaseStatus::ToProcess,
                processors: Processors = Processors::default(),
                origin: Origin = Origin::builder().build(),
                last_heartbeat: DateTime<Utc> = zero_heartbeat(),
            }
        }
    }
}

#[cfg(test)]
#[path = "case_tests.rs"]
mod tests;
