// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use gridagent_catalog::FakeCatalog;
use gridagent_core::CaseRecord;

#[tokio::test]
async fn an_empty_catalog_prints_a_friendly_message_instead_of_a_table() {
    let catalog = FakeCatalog::new();
    run(&catalog, "default", "0", "alice", "host-a").await.unwrap();
}

#[tokio::test]
async fn lists_only_open_cases_for_the_calling_user_and_machine() {
    let catalog = FakeCatalog::new();
    catalog.seed(
        CaseRecord::builder()
            .application("RandomCounter")
            .origin(gridagent_core::Origin::builder().user("alice").machine("host-a").build())
            .build(),
    );
    catalog.seed(
        CaseRecord::builder()
            .application("RandomCounter")
            .origin(gridagent_core::Origin::builder().user("bob").machine("host-b").build())
            .build(),
    );

    run(&catalog, "default", "0", "alice", "host-a").await.unwrap();
}
