// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn round_trips_through_the_wire_strings() {
    let cases = [
        CaseStatus::ToProcess,
        CaseStatus::Processing,
        CaseStatus::Processed,
        CaseStatus::Received,
        CaseStatus::error("file input not found"),
    ];
    for status in cases {
        let s: String = status.clone().into();
        let back = CaseStatus::try_from(s).unwrap();
        assert_eq!(status, back);
    }
}

#[test]
fn error_display_matches_the_source_format() {
    let status = CaseStatus::error("case failed to process already 3 times");
    assert_eq!(status.to_string(), "error: case failed to process already 3 times");
}

#[test]
fn only_received_and_error_are_terminal() {
    assert!(!CaseStatus::ToProcess.is_terminal());
    assert!(!CaseStatus::Processing.is_terminal());
    assert!(!CaseStatus::Processed.is_terminal());
    assert!(CaseStatus::Received.is_terminal());
    assert!(CaseStatus::error("x").is_terminal());
}

#[test]
fn unprefixed_unknown_string_is_treated_as_an_error_reason() {
    let status = CaseStatus::try_from("garbage".to_string()).unwrap();
    assert_eq!(status, CaseStatus::error("garbage"));
}
