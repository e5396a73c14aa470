// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ties the bootstrap config, the pid lock, the catalog connection, the
//! plug-in trampoline, and the capability registry into the one sequence
//! every `gridctl` subcommand that touches the grid runs first.

use crate::config::Config;
use crate::lock::{LockError, SingleInstanceLock};
use gridagent_blobstore::LocalBlobStore;
use gridagent_catalog::{CatalogClient, CatalogError, MongoCatalog, VersionPolicy, VersionStatus};
use gridagent_core::ConfigError;
use gridagent_plugin::{CapabilityRegistry, PluginError, PluginTrampoline};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    /// The `versions` collection refused this build outright (class 1,
    /// taxonomy §7): fatal, the agent must not start any daemon.
    #[error("version policy refused this build: {0}")]
    VersionRefused(String),
}

/// Everything resolved once at startup and shared by every daemon task.
pub struct Bootstrap {
    pub config: Config,
    pub catalog: MongoCatalog,
    pub blobs: LocalBlobStore,
    pub plugins: PluginTrampoline,
    pub capabilities: CapabilityRegistry,
    /// Set when the `versions` collection returned `warning`; the caller
    /// should surface it on the event bus before continuing (class 2).
    pub version_warning: Option<String>,
    _lock: SingleInstanceLock,
}

impl Bootstrap {
    /// `build_version` is checked against the catalog's `versions`
    /// collection before anything else starts (S6).
    pub async fn init(cwd: &Path, build_version: &str) -> Result<Self, BootstrapError> {
        let config = Config::load(cwd)?;

        let lock_path = config.blob_store_root.join(".locks").join(format!("{}.lock", config.instance));
        let lock = SingleInstanceLock::acquire(&lock_path)?;

        let catalog = MongoCatalog::connect(&config.mongodb_uri(), config.database_name()).await?;

        let policy = catalog.version_policy(build_version).await?;
        let version_warning = enforce_version_policy(policy)?;

        let blobs = LocalBlobStore::new(config.blob_store_root.clone());
        let plugins = PluginTrampoline::new(config.applications_dir());
        let capabilities = CapabilityRegistry::load(&config.applications_dir(), &config.machine_csv(), &config.machine)?;

        Ok(Self { config, catalog, blobs, plugins, capabilities, version_warning, _lock: lock })
    }
}

/// The S6 fatal-refusal check, pulled out as a pure function so it can be
/// exercised without a live catalog connection: a `refused` policy aborts
/// startup, a `warning` policy surfaces its message for the caller to log.
pub fn enforce_version_policy(policy: VersionPolicy) -> Result<Option<String>, BootstrapError> {
    if policy.status == VersionStatus::Refused {
        return Err(BootstrapError::VersionRefused(
            policy.message.unwrap_or_else(|| "this build is no longer supported".to_string()),
        ));
    }
    Ok((policy.status == VersionStatus::Warning).then_some(policy.message).flatten())
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;
