// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use async_trait::async_trait;
use gridagent_catalog::FakeCatalog;
use gridagent_core::{CaseRecord, CaseStatus, Processors};
use gridagent_eventbus::EventReader;
use tokio::process::Command;

struct SleepSpawner;

#[async_trait]
impl WorkerSpawner for SleepSpawner {
    async fn spawn(&self, _case_id: &CaseId, _scratch_dir: &std::path::Path) -> std::io::Result<Child> {
        Command::new("sleep").arg("100").kill_on_drop(true).spawn()
    }
}

fn daemon(
    catalog: FakeCatalog,
    desired: DesiredConcurrency,
) -> (ProcessingDaemon<FakeCatalog, SleepSpawner>, EventReader) {
    let (bus, reader) = EventBus::new();
    let scratch = tempfile::tempdir().unwrap();
    let daemon = ProcessingDaemon::new(
        catalog,
        SleepSpawner,
        bus,
        TimingConfig::default(),
        "default",
        "0",
        "bob",
        "host-b",
        vec!["RandomCounter".to_string()],
        scratch.into_path(),
        desired,
    );
    (daemon, reader)
}

#[tokio::test]
async fn phase3_acquires_cases_up_to_the_desired_concurrency() {
    let catalog = FakeCatalog::new();
    catalog.seed(CaseRecord::builder().application("RandomCounter").build());
    catalog.seed(CaseRecord::builder().application("RandomCounter").build());
    let (mut daemon, _reader) = daemon(catalog, DesiredConcurrency::new(2));

    daemon.tick().await.unwrap();

    assert_eq!(daemon.alive_count(), 2);
}

#[tokio::test]
async fn phase3_aborts_a_claim_that_hits_the_attempt_ceiling() {
    let catalog = FakeCatalog::new();
    let case = CaseRecord::builder()
        .application("RandomCounter")
        .status(CaseStatus::Processing)
        .processors(Processors {
            attempts: vec![Attempt::new("a", "h"), Attempt::new("b", "h"), Attempt::new("c", "h")],
            started_at: Some(Utc::now()),
            finished_at: None,
        })
        .last_heartbeat(Utc::now() - chrono::Duration::seconds(200))
        .build();
    let id = case.id;
    catalog.seed(case);
    let (mut daemon, _reader) = daemon(catalog, DesiredConcurrency::new(1));

    daemon.tick().await.unwrap();

    assert_eq!(daemon.alive_count(), 0);
    let record = daemon.catalog.snapshot().into_iter().find(|c| c.id == id).unwrap();
    assert!(record.is_terminal());
}

#[tokio::test]
async fn reducing_desired_concurrency_pauses_the_newest_excess_worker() {
    let catalog = FakeCatalog::new();
    catalog.seed(CaseRecord::builder().application("RandomCounter").build());
    catalog.seed(CaseRecord::builder().application("RandomCounter").build());
    let desired = DesiredConcurrency::new(2);
    let (mut daemon, _reader) = daemon(catalog, desired.clone());
    daemon.tick().await.unwrap();
    assert_eq!(daemon.alive_count(), 2);

    desired.set(1);
    daemon.tick().await.unwrap();
    assert_eq!(daemon.paused_count(), 1);

    desired.set(2);
    daemon.tick().await.unwrap();
    assert_eq!(daemon.paused_count(), 0);
}

#[tokio::test]
async fn dropping_desired_to_zero_asks_for_confirmation() {
    let catalog = FakeCatalog::new();
    catalog.seed(CaseRecord::builder().application("RandomCounter").build());
    let desired = DesiredConcurrency::new(1);
    let (mut daemon, mut reader) = daemon(catalog, desired.clone());
    daemon.tick().await.unwrap();
    assert_eq!(daemon.alive_count(), 1);

    desired.set(0);
    let tick = tokio::spawn(async move {
        daemon.tick().await.unwrap();
        daemon
    });

    let event = reader.recv().await.unwrap();
    let GridEvent::ConfirmTerminate(confirm) = event else {
        panic!("expected a confirm_terminate event, got {event:?}");
    };
    confirm.reply.send(true).unwrap();

    let daemon = tick.await.unwrap();
    assert_eq!(daemon.alive_count(), 0);
}

#[tokio::test]
async fn refusing_termination_restores_desired_concurrency_to_one() {
    let catalog = FakeCatalog::new();
    catalog.seed(CaseRecord::builder().application("RandomCounter").build());
    let desired = DesiredConcurrency::new(1);
    let (mut daemon, mut reader) = daemon(catalog, desired.clone());
    daemon.tick().await.unwrap();

    desired.set(0);
    let tick = tokio::spawn(async move {
        daemon.tick().await.unwrap();
        daemon
    });

    let event = reader.recv().await.unwrap();
    let GridEvent::ConfirmTerminate(confirm) = event else {
        panic!("expected a confirm_terminate event, got {event:?}");
    };
    confirm.reply.send(false).unwrap();

    let daemon = tick.await.unwrap();
    assert_eq!(daemon.alive_count(), 1);
    assert_eq!(desired.get(), 1);
}
