// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gridctl report` — the fixed 19-column TSV export.

use crate::exit_error::ExitError;
use chrono::{DateTime, Utc};
use gridagent_catalog::CatalogClient;
use gridagent_core::{zero_heartbeat, Attempt, CaseRecord};
use std::path::Path;

const HEADER: [&str; 19] = [
    "Server Instance",
    "Application",
    "Current Path",
    "Last signal to server",
    "User Origin",
    "Machine Origin",
    "Path Origin",
    "Current status",
    "Time submitted by originator",
    "Time started to process",
    "Time finished to process",
    "Time received by originator",
    "Number of attempts to process",
    "Processor User 1",
    "Processor Machine 1",
    "Processor User 2",
    "Processor Machine 2",
    "Processor User 3",
    "Processor Machine 3",
];

pub async fn run<C: CatalogClient>(catalog: &C, user_group: &str, out: &Path) -> Result<(), ExitError> {
    let cases = catalog.scan_all(user_group).await.map_err(|err| ExitError::new(1, err.to_string()))?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(out)
        .map_err(|err| ExitError::new(1, format!("failed to open {}: {err}", out.display())))?;

    writer.write_record(HEADER).map_err(|err| ExitError::new(1, err.to_string()))?;
    for case in &cases {
        writer.write_record(row(case)).map_err(|err| ExitError::new(1, err.to_string()))?;
    }
    writer.flush().map_err(|err| ExitError::new(1, err.to_string()))?;
    Ok(())
}

fn row(case: &CaseRecord) -> [String; 19] {
    let attempt = |n: usize| case.processors.attempts.get(n);
    let user = |a: Option<&Attempt>| a.map(|a| a.user.clone()).unwrap_or_default();
    let machine = |a: Option<&Attempt>| a.map(|a| a.machine.clone()).unwrap_or_default();

    [
        case.instance.clone(),
        case.application.clone(),
        case.path.clone(),
        render_heartbeat(case.last_heartbeat),
        case.origin.user.clone(),
        case.origin.machine.clone(),
        case.origin.input_display_path.clone(),
        case.status.to_string(),
        render(Some(case.origin.submitted_at)),
        render(case.processors.started_at),
        render(case.processors.finished_at),
        render(case.origin.received_at),
        case.processors.attempt_count().to_string(),
        user(attempt(0)),
        machine(attempt(0)),
        user(attempt(1)),
        machine(attempt(1)),
        user(attempt(2)),
        machine(attempt(2)),
    ]
}

fn render(value: Option<DateTime<Utc>>) -> String {
    value.map(|t| t.to_rfc3339()).unwrap_or_default()
}

fn render_heartbeat(value: DateTime<Utc>) -> String {
    if value == zero_heartbeat() {
        String::new()
    } else {
        value.to_rfc3339()
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
