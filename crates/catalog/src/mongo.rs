// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! MongoDB-backed catalog. The claim protocol rests entirely on
//! `find_one_and_update`'s atomicity: MongoDB holds a per-document lock for
//! the duration of the operation, so two agents racing for the same case
//! can never both observe a match.

use crate::client::{CatalogClient, VersionPolicy, VersionStatus};
use crate::error::CatalogError;
use async_trait::async_trait;
use bson::{doc, Document};
use chrono::{DateTime, Utc};
use gridagent_core::{Attempt, CaseId, CaseRecord, CaseStatus};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{Client, Collection, Database};

/// A `versions` collection entry: `{_id: version_string, status, message?}`.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct VersionDoc {
    #[serde(rename = "_id")]
    id: String,
    status: String,
    message: Option<String>,
}

#[derive(Clone)]
pub struct MongoCatalog {
    cases: Collection<CaseRecord>,
    versions: Collection<VersionDoc>,
}

impl MongoCatalog {
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, CatalogError> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self::from_database(client.database(db_name)))
    }

    pub fn from_database(db: Database) -> Self {
        Self { cases: db.collection("cases"), versions: db.collection("versions") }
    }

    fn scope(user_group: &str, instance: &str) -> Document {
        doc! { "user_group": user_group, "instance": instance }
    }

    fn oldest_first_opts() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::Before)
            .sort(doc! { "_id": 1 })
            .build()
    }
}

#[async_trait]
impl CatalogClient for MongoCatalog {
    async fn claim_stalled(
        &self,
        user_group: &str,
        instance: &str,
        apps: &[String],
        claimant: &Attempt,
        dead_threshold: chrono::Duration,
        now: DateTime<Utc>,
    ) -> Result<Option<CaseRecord>, CatalogError> {
        let mut filter = Self::scope(user_group, instance);
        filter.insert("application", doc! { "$in": apps });
        filter.insert("status", "processing");
        filter.insert("last_heartbeat", doc! { "$lt": now - dead_threshold });

        let update = doc! {
            "$set": { "status": "processing", "last_heartbeat": now },
            "$push": { "processors.attempts": bson::to_bson(claimant)? },
        };

        let record = self.cases.find_one_and_update(filter, update).with_options(Self::oldest_first_opts()).await?;
        Ok(record)
    }

    async fn claim_new(
        &self,
        user_group: &str,
        instance: &str,
        apps: &[String],
        claimant: &Attempt,
        now: DateTime<Utc>,
    ) -> Result<Option<CaseRecord>, CatalogError> {
        let mut filter = Self::scope(user_group, instance);
        filter.insert("application", doc! { "$in": apps });
        filter.insert("status", "to process");

        let update = doc! {
            "$set": {
                "status": "processing",
                "last_heartbeat": now,
                "processors.started_at": now,
            },
            "$push": { "processors.attempts": bson::to_bson(claimant)? },
        };

        let record = self.cases.find_one_and_update(filter, update).with_options(Self::oldest_first_opts()).await?;
        Ok(record)
    }

    async fn record_attempt_failure(
        &self,
        id: &CaseId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), CatalogError> {
        let status = CaseStatus::error(reason).to_string();
        self.cases
            .update_one(
                doc! { "_id": id.as_str() },
                doc! {
                    "$set": { "status": status, "processors.finished_at": now },
                    "$pop": { "processors.attempts": 1 },
                },
            )
            .await?;
        Ok(())
    }

    async fn mark_error(&self, id: &CaseId, reason: &str, now: DateTime<Utc>) -> Result<(), CatalogError> {
        let status = CaseStatus::error(reason).to_string();
        self.cases
            .update_one(
                doc! { "_id": id.as_str() },
                doc! { "$set": { "status": status, "processors.finished_at": now } },
            )
            .await?;
        Ok(())
    }

    async fn commit_processed(
        &self,
        id: &CaseId,
        out_path: &str,
        now: DateTime<Utc>,
    ) -> Result<(), CatalogError> {
        self.cases
            .update_one(
                doc! { "_id": id.as_str() },
                doc! {
                    "$set": {
                        "status": "processed",
                        "path": out_path,
                        "processors.finished_at": now,
                    },
                },
            )
            .await?;
        Ok(())
    }

    async fn commit_received(&self, id: &CaseId, now: DateTime<Utc>) -> Result<(), CatalogError> {
        self.cases
            .update_one(
                doc! { "_id": id.as_str() },
                doc! {
                    "$set": {
                        "status": "received",
                        "path": "",
                        "origin.received_at": now,
                    },
                },
            )
            .await?;
        Ok(())
    }

    async fn heartbeat(&self, id: &CaseId, now: DateTime<Utc>) -> Result<(), CatalogError> {
        self.cases.update_one(doc! { "_id": id.as_str() }, doc! { "$set": { "last_heartbeat": now } }).await?;
        Ok(())
    }

    async fn insert_case(&self, record: CaseRecord) -> Result<CaseId, CatalogError> {
        let id = record.id;
        self.cases.insert_one(record).await?;
        Ok(id)
    }

    async fn find_my_open_cases(
        &self,
        user_group: &str,
        instance: &str,
        user: &str,
        machine: &str,
    ) -> Result<Vec<CaseRecord>, CatalogError> {
        let mut filter = Self::scope(user_group, instance);
        filter.insert("origin.user", user);
        filter.insert("origin.machine", machine);
        filter.insert("status", doc! { "$in": ["to process", "processing", "processed"] });

        let mut cursor = self.cases.find(filter).await?;
        let mut records = Vec::new();
        while cursor.advance().await? {
            records.push(cursor.deserialize_current()?);
        }
        Ok(records)
    }

    async fn find_my_processed(
        &self,
        user_group: &str,
        instance: &str,
        user: &str,
        machine: &str,
        apps: &[String],
    ) -> Result<Option<CaseRecord>, CatalogError> {
        let mut filter = Self::scope(user_group, instance);
        filter.insert("origin.user", user);
        filter.insert("origin.machine", machine);
        filter.insert("status", "processed");
        filter.insert("application", doc! { "$in": apps });

        let opts = mongodb::options::FindOneOptions::builder().sort(doc! { "_id": 1 }).build();
        Ok(self.cases.find_one(filter).with_options(opts).await?)
    }

    async fn scan_all(&self, user_group: &str) -> Result<Vec<CaseRecord>, CatalogError> {
        let mut cursor = self.cases.find(doc! { "user_group": user_group }).await?;
        let mut records = Vec::new();
        while cursor.advance().await? {
            records.push(cursor.deserialize_current()?);
        }
        Ok(records)
    }

    async fn find_by_id(&self, id: &CaseId) -> Result<Option<CaseRecord>, CatalogError> {
        Ok(self.cases.find_one(doc! { "_id": id.as_str() }).await?)
    }

    async fn version_policy(&self, version: &str) -> Result<VersionPolicy, CatalogError> {
        let doc = self.versions.find_one(doc! { "_id": version }).await?;
        let Some(doc) = doc else {
            return Err(CatalogError::UnknownVersion(version.to_string()));
        };
        Ok(VersionPolicy { status: parse_version_status(&doc.status), message: doc.message })
    }
}

fn parse_version_status(status: &str) -> VersionStatus {
    match status {
        "allowed" => VersionStatus::Allowed,
        "warning" => VersionStatus::Warning,
        other => {
            if other != "refused" {
                tracing::warn!(status = other, "unrecognized version status, treating as refused");
            }
            VersionStatus::Refused
        }
    }
}

#[cfg(test)]
#[path = "mongo_tests.rs"]
mod tests;
