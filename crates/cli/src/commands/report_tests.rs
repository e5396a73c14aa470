// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use gridagent_catalog::FakeCatalog;
use gridagent_core::{Attempt, CaseRecord, Processors};

#[tokio::test]
async fn writes_the_fixed_nineteen_column_header_and_one_row_per_case() {
    let catalog = FakeCatalog::new();
    catalog.seed(
        CaseRecord::builder()
            .application("RandomCounter")
            .processors(Processors { attempts: vec![Attempt::new("bob", "host-b")], ..Default::default() })
            .build(),
    );

    let out = tempfile::NamedTempFile::new().unwrap();
    run(&catalog, "default", out.path()).await.unwrap();

    let contents = std::fs::read_to_string(out.path()).unwrap();
    let mut lines = contents.lines();
    let header = lines.next().unwrap();
    assert_eq!(header.split('\t').count(), 19);
    let row = lines.next().unwrap();
    let cols: Vec<&str> = row.split('\t').collect();
    assert_eq!(cols[1], "RandomCounter");
    assert_eq!(cols[13], "bob");
    assert_eq!(cols[14], "host-b");
    // Unclaimed heartbeat sentinel renders empty.
    assert_eq!(cols[3], "");
}
