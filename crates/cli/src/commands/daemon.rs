// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gridctl daemon run` — starts the processing and receiving daemons
//! in-process and drains the event bus to `tracing` until interrupted.

use crate::exit_error::ExitError;
use gridagent_daemon::Bootstrap;
use gridagent_engine::{DesiredConcurrency, ProcessingDaemon, ReceivingDaemon, ReexecSpawner};
use gridagent_eventbus::{EventBus, EventReader, GridEvent};
use std::path::Path;
use tokio_util::sync::CancellationToken;

pub async fn run(cwd: &Path, build_version: &str, concurrency: u32) -> Result<(), ExitError> {
    let bootstrap = Bootstrap::init(cwd, build_version).await?;
    if let Some(warning) = &bootstrap.version_warning {
        tracing::warn!(%warning, "version policy warning");
    }

    let scratch_root = bootstrap.config.blob_store_root.join(".scratch");
    tokio::fs::create_dir_all(&scratch_root)
        .await
        .map_err(|err| ExitError::new(1, format!("failed to create scratch root: {err}")))?;

    let (bus, reader) = EventBus::new();
    let cancel = CancellationToken::new();
    tokio::spawn(drain(reader));

    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    let spawner = ReexecSpawner::current_exe()
        .map_err(|err| ExitError::new(1, format!("could not resolve current executable: {err}")))?;

    let mut processing = ProcessingDaemon::new(
        bootstrap.catalog.clone(),
        spawner,
        bus.clone(),
        bootstrap.config.timing.clone(),
        &bootstrap.config.user_group,
        &bootstrap.config.instance,
        &bootstrap.config.user,
        &bootstrap.config.machine,
        bootstrap.capabilities.processable().to_vec(),
        scratch_root.clone(),
        DesiredConcurrency::new(concurrency),
    );

    let receiving = ReceivingDaemon::new(
        bootstrap.catalog.clone(),
        bootstrap.blobs.clone(),
        gridagent_plugin::PluginTrampoline::new(bootstrap.config.applications_dir()),
        bus.clone(),
        &bootstrap.config.user_group,
        &bootstrap.config.instance,
        &bootstrap.config.user,
        &bootstrap.config.machine,
        bootstrap.capabilities.receivable().to_vec(),
        scratch_root,
        bootstrap.config.timing.db_connect_frequency,
        bootstrap.config.timing.daemon_pause,
    );

    let processing_cancel = cancel.clone();
    let receiving_cancel = cancel.clone();
    let (processing_result, receiving_reason) = tokio::join!(
        async move { processing.run(processing_cancel).await },
        async move { receiving.run(&receiving_cancel).await },
    );

    tracing::info!(?receiving_reason, "receiving daemon stopped");
    processing_result.map_err(|err| ExitError::new(1, err.to_string()))
}

async fn drain(mut reader: EventReader) {
    while let Some(event) = reader.recv().await {
        if let GridEvent::Critical(message) = event {
            tracing::error!(%message, "critical event, stopping daemon");
        }
    }
}
