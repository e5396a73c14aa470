// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level integration coverage of the S1-S6 scenarios: the claim
//! protocol, the worker pipeline, and the worker-pool supervisor, driven
//! against `FakeCatalog`/`FakeBlobStore` (or a tempdir-backed
//! `LocalBlobStore` where a real archive round-trip matters) rather than a
//! live Mongo/filesystem.

use async_trait::async_trait;
use chrono::Utc;
use gridagent_blobstore::{case_path, pack, result_path, unpack, BlobStore, LocalBlobStore};
use gridagent_catalog::{CatalogClient, FakeCatalog, VersionPolicy, VersionStatus};
use gridagent_core::{Attempt, CaseId, CaseRecord, CaseStatus, Origin};
use gridagent_daemon::{enforce_version_policy, BootstrapError};
use gridagent_engine::{run_case, DesiredConcurrency, ProcessingDaemon, WorkerOutcome, WorkerSpawner};
use gridagent_eventbus::{EventBus, GridEvent, WorkerStatus};
use gridagent_plugin::PluginTrampoline;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tokio::process::{Child, Command};

fn write_script(path: &Path, body: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = std::fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).unwrap();
}

/// S1 — submit and process: one case travels `to process` -> `processing`
/// -> `processed` -> `received`, with the Results archive deleted at the end.
#[tokio::test]
async fn s1_submit_process_and_receive() {
    let blob_root = tempfile::tempdir().unwrap();
    let blobs = LocalBlobStore::new(blob_root.path());
    let apps_root = tempfile::tempdir().unwrap();

    let output_file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(output_file.path(), b"counted: 1").unwrap();
    write_script(
        &apps_root.path().join("RandomCounter/process"),
        &format!("cat > /dev/null; echo '[\"{}\"]'", output_file.path().display()),
    );
    write_script(&apps_root.path().join("RandomCounter/receive"), "cat > /dev/null");
    let plugins = PluginTrampoline::new(apps_root.path());

    let catalog = FakeCatalog::new();

    // Submission: pack one input file and insert the catalog record the way
    // `SubmissionPipeline::submit_one` does.
    let input_file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(input_file.path(), b"hello").unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let input_archive = scratch.path().join("input.zip");
    pack(&[input_file.path().to_path_buf()], &input_archive).unwrap();

    let id = CaseId::new();
    let relative = case_path("alice", "host-a", id.as_str());
    blobs.put(&relative, &input_archive).await.unwrap();

    let record = CaseRecord::builder()
        .id(id)
        .application("RandomCounter")
        .path(relative.clone())
        .origin(Origin::builder().user("alice").machine("host-a").build())
        .build();
    assert_eq!(record.status, CaseStatus::ToProcess);
    catalog.seed(record);

    // Agent B claims and runs the case.
    let claimant = Attempt::new("bob", "host-b");
    let claimed = catalog
        .claim_new("default", "0", &["RandomCounter".to_string()], &claimant, Utc::now())
        .await
        .unwrap()
        .expect("a to-process case should be claimable");
    assert_eq!(claimed.id, id);

    let bus = EventBus::new().0;
    let outcome = run_case(&catalog, &blobs, &plugins, scratch.path(), &claimed, &bus).await.unwrap();
    assert_eq!(outcome, WorkerOutcome::Processed);

    let processed = catalog.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(processed.status, CaseStatus::Processed);
    assert_eq!(processed.path, result_path("alice", "host-a", &id.to_string()));

    // Agent A's receiving daemon picks it up.
    let found = catalog
        .find_my_processed("default", "0", "alice", "host-a", &["RandomCounter".to_string()])
        .await
        .unwrap()
        .expect("the processed case should show up for its originator");
    let local_results = scratch.path().join("output.zip");
    blobs.get(&found.path, &local_results).await.unwrap();
    let outputs = unpack(&local_results, scratch.path()).unwrap();
    plugins.receive_case("RandomCounter", &outputs).await.unwrap();
    catalog.commit_received(&found.id, Utc::now()).await.unwrap();
    blobs.remove(&found.path).await.unwrap();

    let received = catalog.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(received.status, CaseStatus::Received);
    assert_eq!(received.path, "");
    assert!(!blob_root.path().join(&found.path).exists(), "the Results archive should be deleted");
}

/// S2 — attempt exhaustion: a stalled case on its fourth claim is rolled
/// back to terminal rather than handed to a worker.
#[tokio::test]
async fn s2_attempt_exhaustion_goes_terminal() {
    let catalog = FakeCatalog::new();
    let case = CaseRecord::builder()
        .application("RandomCounter")
        .status(CaseStatus::Processing)
        .processors(gridagent_core::Processors {
            attempts: vec![Attempt::new("u1", "h1"), Attempt::new("u2", "h2"), Attempt::new("u3", "h3")],
            started_at: Some(Utc::now()),
            finished_at: None,
        })
        .last_heartbeat(Utc::now() - chrono::Duration::seconds(300))
        .build();
    let id = case.id;
    catalog.seed(case);

    let claimant = Attempt::new("x", "hx");
    let claimed = catalog
        .claim_stalled("default", "0", &["RandomCounter".to_string()], &claimant, chrono::Duration::seconds(120), Utc::now())
        .await
        .unwrap()
        .expect("a stalled case should be claimable");
    assert_eq!(claimed.processors.attempt_count(), 3, "claim_stalled returns the pre-update document");

    catalog.record_attempt_failure(&id, "case failed to process already 3 times", Utc::now()).await.unwrap();

    let final_record = catalog.find_by_id(&id).await.unwrap().unwrap();
    assert!(final_record.is_terminal());
    assert_eq!(final_record.processors.attempt_count(), 3, "the just-appended 4th attempt was popped");
}

struct SleepSpawner;

#[async_trait]
impl WorkerSpawner for SleepSpawner {
    async fn spawn(&self, _case_id: &CaseId, _scratch_dir: &Path) -> std::io::Result<Child> {
        Command::new("sleep").arg("100").kill_on_drop(true).spawn()
    }
}

/// S3 — pause/resume: dropping `desired_concurrency` below the running
/// count pauses a worker and fires `MyProcessStatusChanged`; raising it
/// back resumes.
#[tokio::test]
async fn s3_pause_and_resume_a_worker() {
    let catalog = FakeCatalog::new();
    catalog.seed(CaseRecord::builder().application("RandomCounter").build());
    catalog.seed(CaseRecord::builder().application("RandomCounter").build());

    let desired = DesiredConcurrency::new(2);
    let (bus, mut reader) = EventBus::new();
    let scratch = tempfile::tempdir().unwrap();
    let mut daemon = ProcessingDaemon::new(
        catalog,
        SleepSpawner,
        bus,
        gridagent_core::TimingConfig::default(),
        "default",
        "0",
        "bob",
        "host-b",
        vec!["RandomCounter".to_string()],
        scratch.path(),
        desired.clone(),
    );
    daemon.tick().await.unwrap();
    assert_eq!(daemon.alive_count(), 2);

    desired.set(1);
    daemon.tick().await.unwrap();
    assert_eq!(daemon.paused_count(), 1);

    desired.set(2);
    daemon.tick().await.unwrap();
    assert_eq!(daemon.paused_count(), 0);

    // Drain events looking for the pause/resume transition.
    let mut saw_paused = false;
    let mut saw_resumed = false;
    while let Some(event) = reader.try_recv() {
        if let GridEvent::MyProcessStatusChanged { status, .. } = event {
            match status {
                WorkerStatus::Paused => saw_paused = true,
                WorkerStatus::Processing => saw_resumed = true,
            }
        }
    }
    assert!(saw_paused && saw_resumed);
}

/// S4 — terminate-all confirmation: dropping `desired_concurrency` to zero
/// with work in flight asks before killing anything, and restores
/// `desired_concurrency` to 1 on a "cancel" answer.
#[tokio::test]
async fn s4_terminate_all_requires_confirmation() {
    let catalog = FakeCatalog::new();
    catalog.seed(CaseRecord::builder().application("RandomCounter").build());

    let desired = DesiredConcurrency::new(1);
    let (bus, mut reader) = EventBus::new();
    let scratch = tempfile::tempdir().unwrap();
    let mut daemon = ProcessingDaemon::new(
        catalog,
        SleepSpawner,
        bus,
        gridagent_core::TimingConfig::default(),
        "default",
        "0",
        "bob",
        "host-b",
        vec!["RandomCounter".to_string()],
        scratch.path(),
        desired.clone(),
    );
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
    confirm.reply.send(false).unwrap();
    let daemon = tick.await.unwrap();
    assert_eq!(daemon.alive_count(), 1, "a \"cancel\" answer leaves the worker running");
    assert_eq!(desired.get(), 1, "\"cancel\" forces desired_concurrency back to 1");
}

/// S5 — missing input: a worker whose archive has vanished from the blob
/// store marks the case terminally errored, and no peer ever re-claims it.
#[tokio::test]
async fn s5_missing_input_archive_is_terminal_and_unclaimable() {
    let blob_root = tempfile::tempdir().unwrap();
    let blobs = LocalBlobStore::new(blob_root.path());
    let apps_root = tempfile::tempdir().unwrap();
    let plugins = PluginTrampoline::new(apps_root.path());
    let catalog = FakeCatalog::new();

    let case = CaseRecord::builder()
        .application("RandomCounter")
        .status(CaseStatus::Processing)
        .path("Cases/alice/host-a/case-missing")
        .build();
    let id = case.id;
    catalog.seed(case.clone());

    let scratch = tempfile::tempdir().unwrap();
    let bus = EventBus::new().0;
    let outcome = run_case(&catalog, &blobs, &plugins, scratch.path(), &case, &bus).await.unwrap();
    assert_eq!(outcome, WorkerOutcome::TerminalError);

    let record = catalog.find_by_id(&id).await.unwrap().unwrap();
    assert!(record.is_terminal());

    let claimant = Attempt::new("peer", "host-p");
    let reclaimed = catalog
        .claim_stalled("default", "0", &["RandomCounter".to_string()], &claimant, chrono::Duration::seconds(0), Utc::now())
        .await
        .unwrap();
    assert!(reclaimed.is_none(), "a terminally errored case must never be claimable again");
}

/// S6 — version refused: a `refused` build policy aborts startup with the
/// catalog's message before any daemon can run. `Bootstrap::init` requires a
/// live catalog connection to reach this check, so it is exercised directly
/// against the same decision `Bootstrap::init` makes.
#[test]
fn s6_refused_version_aborts_startup() {
    let policy = VersionPolicy { status: VersionStatus::Refused, message: Some("obsolete".to_string()) };

    let err = enforce_version_policy(policy).unwrap_err();

    assert!(matches!(err, BootstrapError::VersionRefused(msg) if msg == "obsolete"));
}
