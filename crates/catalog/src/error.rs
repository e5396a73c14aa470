// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use gridagent_core::CaseId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog operation failed: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("failed to encode a value for the catalog: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("case {0} not found")]
    NotFound(CaseId),

    #[error("version {0} is not recognized by the catalog")]
    UnknownVersion(String),

    #[error("catalog credentials were refused")]
    CredentialsRefused,
}
