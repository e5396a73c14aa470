// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The catalog client boundary — a thin typed wrapper over the document
//! database holding `cases` and `versions`.

use crate::error::CatalogError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gridagent_core::{Attempt, CaseId, CaseRecord};

/// Outcome of a `versions` lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionStatus {
    Allowed,
    Warning,
    Refused,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPolicy {
    pub status: VersionStatus,
    pub message: Option<String>,
}

/// Atomic claim/update/query operations over the case catalog.
///
/// All claim operations are single atomic find-and-update calls: the
/// *pre-update* document is returned so the caller can inspect the prior
/// attempt count before deciding whether the just-appended attempt pushed
/// the case past the retry ceiling.
#[async_trait]
pub trait CatalogClient: Send + Sync + 'static {
    /// Atomically claim a `processing` case whose heartbeat is older than
    /// `dead_threshold`, scoped to `user_group`/`instance` and one of
    /// `apps`. Appends `claimant` to `processors.attempts` and refreshes
    /// `last_heartbeat` as part of the same update. Returns the record as
    /// it was *before* the update, or `None` if no case matched.
    async fn claim_stalled(
        &self,
        user_group: &str,
        instance: &str,
        apps: &[String],
        claimant: &Attempt,
        dead_threshold: chrono::Duration,
        now: DateTime<Utc>,
    ) -> Result<Option<CaseRecord>, CatalogError>;

    /// Atomically claim a `to process` case, flipping it to `processing`.
    /// Same pre-update-return semantics as [`Self::claim_stalled`].
    async fn claim_new(
        &self,
        user_group: &str,
        instance: &str,
        apps: &[String],
        claimant: &Attempt,
        now: DateTime<Utc>,
    ) -> Result<Option<CaseRecord>, CatalogError>;

    /// Abort a claim that turned out to be a case's fourth attempt: sets
    /// the case terminal and pops the attempt the claim just appended,
    /// undoing the claim's side effect.
    async fn record_attempt_failure(
        &self,
        id: &CaseId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), CatalogError>;

    /// Mark a case terminally failed for a reason unrelated to the attempt
    /// ceiling (missing input/output archive). Unlike
    /// [`Self::record_attempt_failure`], the attempt list is left untouched
    /// — the attempt that hit the missing archive was a genuine attempt.
    async fn mark_error(&self, id: &CaseId, reason: &str, now: DateTime<Utc>) -> Result<(), CatalogError>;

    /// Commit a case's output: `status=processed`, `path=out_path`,
    /// `finished_at=now`.
    async fn commit_processed(
        &self,
        id: &CaseId,
        out_path: &str,
        now: DateTime<Utc>,
    ) -> Result<(), CatalogError>;

    /// Commit receipt: `status=received`, `path=""`, `origin.received_at=now`.
    async fn commit_received(&self, id: &CaseId, now: DateTime<Utc>) -> Result<(), CatalogError>;

    /// Refresh `last_heartbeat` for an in-flight case.
    async fn heartbeat(&self, id: &CaseId, now: DateTime<Utc>) -> Result<(), CatalogError>;

    /// Insert a freshly submitted case. Returns the catalog-assigned id.
    async fn insert_case(&self, record: CaseRecord) -> Result<CaseId, CatalogError>;

    /// All non-terminal cases originated by `{user, machine}` — used to
    /// populate the "my cases" view.
    async fn find_my_open_cases(
        &self,
        user_group: &str,
        instance: &str,
        user: &str,
        machine: &str,
    ) -> Result<Vec<CaseRecord>, CatalogError>;

    /// The next `processed` case originated by `{user, machine}` whose
    /// application is locally receivable, oldest first.
    async fn find_my_processed(
        &self,
        user_group: &str,
        instance: &str,
        user: &str,
        machine: &str,
        apps: &[String],
    ) -> Result<Option<CaseRecord>, CatalogError>;

    /// Every case in `user_group`, for the report export.
    async fn scan_all(&self, user_group: &str) -> Result<Vec<CaseRecord>, CatalogError>;

    /// Look up a single case by id — used by a worker subprocess to
    /// recover the record its parent daemon claimed before spawning it.
    async fn find_by_id(&self, id: &CaseId) -> Result<Option<CaseRecord>, CatalogError>;

    /// Consult the `versions` collection for this build's version string.
    async fn version_policy(&self, version: &str) -> Result<VersionPolicy, CatalogError>;
}
