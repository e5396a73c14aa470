// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn write(path: &std::path::Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

#[tokio::test]
async fn missing_bootstrap_files_surface_as_a_config_error_before_any_network_call() {
    let cwd = tempfile::tempdir().unwrap();

    let err = Bootstrap::init(cwd.path(), "1.0").await.unwrap_err();

    assert!(matches!(err, BootstrapError::Config(_)));
}

#[tokio::test]
async fn a_lock_already_held_by_another_instance_is_reported_before_any_network_call() {
    let cwd = tempfile::tempdir().unwrap();
    let blob_store = tempfile::tempdir().unwrap();
    write(&cwd.path().join("server.txt"), &format!("{}\n", blob_store.path().display()));
    write(
        &blob_store.path().join("Settings/settings.txt"),
        "mongodb server: db:27017\nuser group: acme\npassword: hunter2\ninstance: 0\n",
    );
    let lock_path = blob_store.path().join(".locks").join("0.lock");
    let _held = SingleInstanceLock::acquire(&lock_path).unwrap();

    let err = Bootstrap::init(cwd.path(), "1.0").await.unwrap_err();

    assert!(matches!(err, BootstrapError::Lock(LockError::AlreadyRunning(_))));
}

#[test]
fn a_refused_version_policy_aborts_before_any_daemon_starts() {
    let policy = VersionPolicy { status: VersionStatus::Refused, message: Some("obsolete".to_string()) };

    let err = enforce_version_policy(policy).unwrap_err();

    assert!(matches!(err, BootstrapError::VersionRefused(msg) if msg == "obsolete"));
}

#[test]
fn a_warning_version_policy_surfaces_its_message_without_erroring() {
    let policy = VersionPolicy { status: VersionStatus::Warning, message: Some("please upgrade soon".to_string()) };

    let warning = enforce_version_policy(policy).unwrap();

    assert_eq!(warning.as_deref(), Some("please upgrade soon"));
}

#[test]
fn an_allowed_version_policy_produces_no_warning() {
    let policy = VersionPolicy { status: VersionStatus::Allowed, message: None };

    let warning = enforce_version_policy(policy).unwrap();

    assert_eq!(warning, None);
}
