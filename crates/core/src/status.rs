// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Case status — the state machine a case record moves through.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a case record in the catalog.
///
/// Serializes to/from the exact strings the catalog stores, so that a
/// hand-written Mongo query (`{"status": "to process"}`) and this type
/// stay in lockstep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CaseStatus {
    ToProcess,
    Processing,
    Processed,
    Received,
    /// Terminal failure with a human-readable reason, e.g. `"file input not found"`.
    Error(String),
}

impl CaseStatus {
    pub const ERROR_PREFIX: &'static str = "error: ";

    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error(reason.into())
    }

    /// A case is terminal iff `status ∈ {received, error:*}` — never re-claimed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaseStatus::Received | CaseStatus::Error(_))
    }

    pub fn is_to_process(&self) -> bool {
        matches!(self, CaseStatus::ToProcess)
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, CaseStatus::Processing)
    }

    pub fn is_processed(&self) -> bool {
        matches!(self, CaseStatus::Processed)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseStatus::ToProcess => f.write_str("to process"),
            CaseStatus::Processing => f.write_str("processing"),
            CaseStatus::Processed => f.write_str("processed"),
            CaseStatus::Received => f.write_str("received"),
            CaseStatus::Error(reason) => write!(f, "{}{reason}", Self::ERROR_PREFIX),
        }
    }
}

impl From<CaseStatus> for String {
    fn from(s: CaseStatus) -> Self {
        s.to_string()
    }
}

impl TryFrom<String> for CaseStatus {
    type Error = std::convert::Infallible;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Ok(match s.as_str() {
            "to process" => CaseStatus::ToProcess,
            "processing" => CaseStatus::Processing,
            "processed" => CaseStatus::Processed,
            "received" => CaseStatus::Received,
            _ => match s.strip_prefix(Self::ERROR_PREFIX) {
                Some(reason) => CaseStatus::Error(reason.to_string()),
                None => CaseStatus::Error(s),
            },
        })
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
