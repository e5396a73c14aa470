// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory catalog for tests. Reproduces the same pre-update-return and
//! FIFO-by-insertion-order semantics as [`crate::mongo::MongoCatalog`] so
//! that engine tests can exercise the real claim logic without a server.

use crate::client::{CatalogClient, VersionPolicy, VersionStatus};
use crate::error::CatalogError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gridagent_core::{Attempt, CaseId, CaseRecord, CaseStatus};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
struct State {
    // Insertion-ordered; index is the FIFO tiebreaker the Mongo `sort` by
    // `_id` approximates for cases inserted in order.
    cases: Vec<CaseRecord>,
    versions: HashMap<String, VersionPolicy>,
}

#[derive(Default)]
pub struct FakeCatalog {
    state: Mutex<State>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, record: CaseRecord) {
        self.state.lock().cases.push(record);
    }

    pub fn set_version_policy(&self, version: impl Into<String>, policy: VersionPolicy) {
        self.state.lock().versions.insert(version.into(), policy);
    }

    pub fn snapshot(&self) -> Vec<CaseRecord> {
        self.state.lock().cases.clone()
    }

    fn find_and_claim(
        cases: &mut [CaseRecord],
        user_group: &str,
        instance: &str,
        apps: &[String],
        matches: impl Fn(&CaseRecord) -> bool,
        claimant: &Attempt,
        now: DateTime<Utc>,
        set_started_at: bool,
    ) -> Option<CaseRecord> {
        let case = cases.iter_mut().find(|c| {
            c.user_group == user_group
                && c.instance == instance
                && apps.iter().any(|a| a == &c.application)
                && matches(c)
        })?;
        let pre_update = case.clone();
        case.status = CaseStatus::Processing;
        case.last_heartbeat = now;
        case.processors.attempts.push(claimant.clone());
        if set_started_at {
            case.processors.started_at = Some(now);
        }
        Some(pre_update)
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn claim_stalled(
        &self,
        user_group: &str,
        instance: &str,
        apps: &[String],
        claimant: &Attempt,
        dead_threshold: chrono::Duration,
        now: DateTime<Utc>,
    ) -> Result<Option<CaseRecord>, CatalogError> {
        let mut state = self.state.lock();
        Ok(Self::find_and_claim(
            &mut state.cases,
            user_group,
            instance,
            apps,
            |c| c.status.is_processing() && now - c.last_heartbeat > dead_threshold,
            claimant,
            now,
            false,
        ))
    }

    async fn claim_new(
        &self,
        user_group: &str,
        instance: &str,
        apps: &[String],
        claimant: &Attempt,
        now: DateTime<Utc>,
    ) -> Result<Option<CaseRecord>, CatalogError> {
        let mut state = self.state.lock();
        Ok(Self::find_and_claim(
            &mut state.cases,
            user_group,
            instance,
            apps,
            |c| c.status.is_to_process(),
            claimant,
            now,
            true,
        ))
    }

    async fn record_attempt_failure(
        &self,
        id: &CaseId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), CatalogError> {
        let mut state = self.state.lock();
        let case = state.cases.iter_mut().find(|c| &c.id == id).ok_or(CatalogError::NotFound(*id))?;
        case.status = CaseStatus::error(reason);
        case.processors.finished_at = Some(now);
        case.processors.attempts.pop();
        Ok(())
    }

    async fn mark_error(&self, id: &CaseId, reason: &str, now: DateTime<Utc>) -> Result<(), CatalogError> {
        let mut state = self.state.lock();
        let case = state.cases.iter_mut().find(|c| &c.id == id).ok_or(CatalogError::NotFound(*id))?;
        case.status = CaseStatus::error(reason);
        case.processors.finished_at = Some(now);
        Ok(())
    }

    async fn commit_processed(
        &self,
        id: &CaseId,
        out_path: &str,
        now: DateTime<Utc>,
    ) -> Result<(), CatalogError> {
        let mut state = self.state.lock();
        let case = state.cases.iter_mut().find(|c| &c.id == id).ok_or(CatalogError::NotFound(*id))?;
        case.status = CaseStatus::Processed;
        case.path = out_path.to_string();
        case.processors.finished_at = Some(now);
        Ok(())
    }

    async fn commit_received(&self, id: &CaseId, now: DateTime<Utc>) -> Result<(), CatalogError> {
        let mut state = self.state.lock();
        let case = state.cases.iter_mut().find(|c| &c.id == id).ok_or(CatalogError::NotFound(*id))?;
        case.status = CaseStatus::Received;
        case.path.clear();
        case.origin.received_at = Some(now);
        Ok(())
    }

    async fn heartbeat(&self, id: &CaseId, now: DateTime<Utc>) -> Result<(), CatalogError> {
        let mut state = self.state.lock();
        let case = state.cases.iter_mut().find(|c| &c.id == id).ok_or(CatalogError::NotFound(*id))?;
        case.last_heartbeat = now;
        Ok(())
    }

    async fn insert_case(&self, record: CaseRecord) -> Result<CaseId, CatalogError> {
        let id = record.id;
        self.state.lock().cases.push(record);
        Ok(id)
    }

    async fn find_my_open_cases(
        &self,
        user_group: &str,
        instance: &str,
        user: &str,
        machine: &str,
    ) -> Result<Vec<CaseRecord>, CatalogError> {
        let state = self.state.lock();
        Ok(state
            .cases
            .iter()
            .filter(|c| {
                c.user_group == user_group
                    && c.instance == instance
                    && c.origin.user == user
                    && c.origin.machine == machine
                    && !c.status.is_terminal()
            })
            .cloned()
            .collect())
    }

    async fn find_my_processed(
        &self,
        user_group: &str,
        instance: &str,
        user: &str,
        machine: &str,
        apps: &[String],
    ) -> Result<Option<CaseRecord>, CatalogError> {
        let state = self.state.lock();
        Ok(state
            .cases
            .iter()
            .find(|c| {
                c.user_group == user_group
                    && c.instance == instance
                    && c.origin.user == user
                    && c.origin.machine == machine
                    && c.status.is_processed()
                    && apps.iter().any(|a| a == &c.application)
            })
            .cloned())
    }

    async fn scan_all(&self, user_group: &str) -> Result<Vec<CaseRecord>, CatalogError> {
        let state = self.state.lock();
        Ok(state.cases.iter().filter(|c| c.user_group == user_group).cloned().collect())
    }

    async fn find_by_id(&self, id: &CaseId) -> Result<Option<CaseRecord>, CatalogError> {
        Ok(self.state.lock().cases.iter().find(|c| &c.id == id).cloned())
    }

    async fn version_policy(&self, version: &str) -> Result<VersionPolicy, CatalogError> {
        self.state
            .lock()
            .versions
            .get(version)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownVersion(version.to_string()))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
