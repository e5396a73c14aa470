// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("application {0} has no {1} plug-in")]
    NotAvailable(String, &'static str),

    #[error("failed to launch plug-in at {path}: {source}")]
    Spawn { path: PathBuf, #[source] source: std::io::Error },

    #[error("plug-in at {0} exited with a non-zero status")]
    NonZeroExit(PathBuf),

    #[error("plug-in at {0} produced output that was not valid JSON: {1}")]
    InvalidJson(PathBuf, #[source] serde_json::Error),

    #[error("failed to encode input for plug-in at {0}: {1}")]
    EncodeInput(PathBuf, #[source] serde_json::Error),

    #[error("failed to write to plug-in stdin at {0}: {1}")]
    WriteStdin(PathBuf, #[source] std::io::Error),

    #[error("failed to read plug-in output at {0}: {1}")]
    ReadOutput(PathBuf, #[source] std::io::Error),

    #[error(
        "select_input_files must return a list of lists of strings, got: {0}"
    )]
    MalformedCases(String),

    #[error("failed to read capability CSV {path}: {source}")]
    Csv { path: PathBuf, #[source] source: csv::Error },

    #[error("capability CSV {path} has no `Machine name` column")]
    MissingMachineColumn { path: PathBuf },
}
