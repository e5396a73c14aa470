// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gridctl status` — a human-readable view of the caller's own open cases.

use crate::exit_error::ExitError;
use gridagent_catalog::CatalogClient;
use gridagent_core::short;

pub async fn run<C: CatalogClient>(
    catalog: &C,
    user_group: &str,
    instance: &str,
    user: &str,
    machine: &str,
) -> Result<(), ExitError> {
    let cases = catalog
        .find_my_open_cases(user_group, instance, user, machine)
        .await
        .map_err(|err| ExitError::new(1, err.to_string()))?;

    if cases.is_empty() {
        println!("No open cases for {user}@{machine}");
        return Ok(());
    }

    println!("{:<12} {:<20} {:<12} {:>8}", "ID", "APPLICATION", "STATUS", "ATTEMPTS");
    for case in &cases {
        println!(
            "{:<12} {:<20} {:<12} {:>8}",
            short(case.id.as_str(), 12),
            case.application,
            case.status,
            case.processors.attempt_count(),
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
