// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised while loading and validating daemon configuration.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, #[source] source: std::io::Error },

    #[error("failed to parse {path} as TOML: {source}")]
    Toml { path: PathBuf, #[source] source: toml::de::Error },

    #[error("failed to parse {path} as JSON: {source}")]
    Json { path: PathBuf, #[source] source: serde_json::Error },

    #[error("failed to parse {path} as CSV: {source}")]
    Csv { path: PathBuf, #[source] source: csv::Error },

    #[error("{field} must be set in {path}")]
    MissingField { path: PathBuf, field: &'static str },

    #[error("{field} in {path} must be positive, got {value}")]
    NotPositive { path: PathBuf, field: &'static str, value: i64 },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
