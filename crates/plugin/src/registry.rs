// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capability registry: which applications this host may run.
//!
//! Combines a per-machine permission table (`Software_Per_Machine.csv`)
//! with what is actually present on disk — "importable" is reinterpreted
//! as "the plug-in's entry-point file exists and is executable".

use crate::error::PluginError;
use std::collections::HashSet;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub struct CapabilityRegistry {
    /// Applications this host may both run `process` for AND is permitted
    /// to run, per the CSV — the processing daemon's working set.
    processable: Vec<String>,
    /// Applications with a local `receive` plug-in, independent of the CSV
    /// — the receiving daemon is enabled whenever this is non-empty.
    receivable: Vec<String>,
}

impl CapabilityRegistry {
    pub fn load(
        applications_dir: &Path,
        machine_csv: &Path,
        hostname: &str,
    ) -> Result<Self, PluginError> {
        let permitted = permitted_applications(machine_csv, hostname)?;
        let local_process = locally_executable(applications_dir, "process");
        let local_receive = locally_executable(applications_dir, "receive");

        let mut processable: Vec<String> =
            permitted.intersection(&local_process).cloned().collect();
        processable.sort();

        let mut receivable: Vec<String> = local_receive.into_iter().collect();
        receivable.sort();

        Ok(Self { processable, receivable })
    }

    /// Applications this host is both permitted and equipped to process.
    /// An empty slice disables the processing daemon for this host.
    pub fn processable(&self) -> &[String] {
        &self.processable
    }

    /// Applications this host can run `receive` for, irrespective of the
    /// permission table. Non-empty enables the receiving daemon.
    pub fn receivable(&self) -> &[String] {
        &self.receivable
    }
}

fn permitted_applications(csv_path: &Path, hostname: &str) -> Result<HashSet<String>, PluginError> {
    let mut reader = csv::Reader::from_path(csv_path)
        .map_err(|source| PluginError::Csv { path: csv_path.to_path_buf(), source })?;

    let headers = reader
        .headers()
        .map_err(|source| PluginError::Csv { path: csv_path.to_path_buf(), source })?
        .clone();
    let machine_col = headers
        .iter()
        .position(|h| h == "Machine name")
        .ok_or_else(|| PluginError::MissingMachineColumn { path: csv_path.to_path_buf() })?;

    for record in reader.records() {
        let record = record.map_err(|source| PluginError::Csv { path: csv_path.to_path_buf(), source })?;
        if record.get(machine_col) != Some(hostname) {
            continue;
        }
        let mut apps = HashSet::new();
        for (col, value) in record.iter().enumerate() {
            if col == machine_col {
                continue;
            }
            if value == "1" {
                if let Some(app) = headers.get(col) {
                    apps.insert(app.to_string());
                }
            }
        }
        return Ok(apps);
    }
    Ok(HashSet::new())
}

fn locally_executable(applications_dir: &Path, entry_point: &str) -> HashSet<String> {
    let mut apps = HashSet::new();
    let Ok(entries) = std::fs::read_dir(applications_dir) else {
        return apps;
    };
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else { continue };
        if !file_type.is_dir() {
            continue;
        }
        let candidate: PathBuf = entry.path().join(entry_point);
        if is_executable(&candidate) {
            if let Some(name) = entry.file_name().to_str() {
                apps.insert(name.to_string());
            }
        }
    }
    apps
}

fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.permissions().mode() & 0o111 != 0).unwrap_or(false)
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
