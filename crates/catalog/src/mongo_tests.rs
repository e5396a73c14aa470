// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn known_statuses_map_directly() {
    assert_eq!(parse_version_status("allowed"), VersionStatus::Allowed);
    assert_eq!(parse_version_status("warning"), VersionStatus::Warning);
    assert_eq!(parse_version_status("refused"), VersionStatus::Refused);
}

#[test]
fn unrecognized_status_is_treated_as_refused() {
    assert_eq!(parse_version_status("garbage"), VersionStatus::Refused);
}

// The claim/commit/scan operations are exercised against a real server in
// `tests/specs.rs` (gated on `GRIDAGENT_MONGO_URI`) since their atomicity
// guarantees cannot be meaningfully faked with a mock collection.
