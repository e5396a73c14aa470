// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The hidden `worker` subcommand: the body of one re-exec'd worker
//! subprocess. Invoked only by [`gridagent_engine::ReexecSpawner`], never
//! directly by a user.

use crate::exit_error::ExitError;
use gridagent_catalog::CatalogClient;
use gridagent_core::CaseId;
use gridagent_daemon::Bootstrap;
use gridagent_eventbus::EventBus;
use std::path::{Path, PathBuf};

pub async fn run(cwd: &Path, build_version: &str, case_id: &str, scratch: PathBuf) -> Result<(), ExitError> {
    let bootstrap = Bootstrap::init(cwd, build_version).await?;
    let id = CaseId::from_string(case_id);

    let case = bootstrap
        .catalog
        .find_by_id(&id)
        .await
        .map_err(|err| ExitError::new(1, err.to_string()))?
        .ok_or_else(|| ExitError::new(1, format!("case {case_id} not found in catalog")))?;

    let (bus, _reader) = EventBus::new();
    gridagent_engine::run_case(&bootstrap.catalog, &bootstrap.blobs, &bootstrap.plugins, &scratch, &case, &bus)
        .await
        .map_err(|err| ExitError::new(1, err.to_string()))?;
    Ok(())
}
