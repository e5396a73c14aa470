// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Duration;

fn record() -> CaseRecord {
    CaseRecord::builder().build()
}

#[test]
fn to_process_is_always_claimable() {
    let case = record();
    assert!(case.is_claimable(Utc::now(), Duration::seconds(120)));
}

#[test]
fn processing_with_a_recent_heartbeat_is_not_claimable() {
    let now = Utc::now();
    let case = CaseRecord::builder()
        .status(CaseStatus::Processing)
        .last_heartbeat(now)
        .build();
    assert!(!case.is_claimable(now, Duration::seconds(120)));
}

#[test]
fn processing_with_a_stale_heartbeat_is_claimable() {
    let now = Utc::now();
    let case = CaseRecord::builder()
        .status(CaseStatus::Processing)
        .last_heartbeat(now - Duration::seconds(121))
        .build();
    assert!(case.is_claimable(now, Duration::seconds(120)));
}

#[test]
fn terminal_statuses_are_never_claimable() {
    let now = Utc::now();
    for status in [CaseStatus::Processed, CaseStatus::Received, CaseStatus::error("boom")] {
        let case = CaseRecord::builder().status(status).build();
        assert!(!case.is_claimable(now, Duration::seconds(120)));
    }
}

#[test]
fn attempt_count_tracks_the_attempt_list_length() {
    let mut processors = Processors::default();
    assert_eq!(processors.attempt_count(), 0);
    processors.attempts.push(Attempt::new("alice", "host-a"));
    processors.attempts.push(Attempt::new("bob", "host-b"));
    assert_eq!(processors.attempt_count(), 2);
    assert_eq!(processors.current_owner(), Some(&Attempt::new("bob", "host-b")));
}

#[test]
fn zero_heartbeat_is_a_fixed_sentinel_older_than_any_real_heartbeat() {
    let sentinel = zero_heartbeat();
    assert!(Utc::now() - sentinel > Duration::days(365 * 50));
}
