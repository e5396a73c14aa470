// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use gridagent_blobstore::FakeBlobStore;
use gridagent_catalog::FakeCatalog;
use std::os::unix::fs::PermissionsExt;

fn write_send_script(apps_dir: &std::path::Path, cases_json: &str) {
    let app_dir = apps_dir.join("RandomCounter");
    std::fs::create_dir_all(&app_dir).unwrap();
    let script = app_dir.join("send");
    std::fs::write(&script, format!("#!/bin/sh\ncat > /dev/null\necho '{cases_json}'\n")).unwrap();
    let mut perms = std::fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script, perms).unwrap();
}

#[tokio::test]
async fn submits_every_case_the_plugin_selects() {
    let apps_root = tempfile::tempdir().unwrap();
    write_send_script(apps_root.path(), r#"[["input-one.txt"]]"#);

    let input_file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(input_file.path(), b"hello").unwrap();

    run(
        FakeCatalog::new(),
        FakeBlobStore::new(),
        PluginTrampoline::new(apps_root.path()),
        "default",
        "0",
        "alice",
        "host-a",
        "RandomCounter",
        vec![input_file.path().to_path_buf()],
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn an_app_with_no_send_entry_point_fails_with_an_exit_error() {
    let apps_root = tempfile::tempdir().unwrap();

    let err = run(
        FakeCatalog::new(),
        FakeBlobStore::new(),
        PluginTrampoline::new(apps_root.path()),
        "default",
        "0",
        "alice",
        "host-a",
        "RandomCounter",
        vec![PathBuf::from("/tmp/whatever")],
    )
    .await
    .unwrap_err();

    assert_eq!(err.code, 1);
}
