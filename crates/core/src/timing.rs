// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timing constants shared by the processing and receiving daemons.
//!
//! Defaults mirror the original implementation's hardcoded intervals; all
//! are overridable from `settings.txt` at daemon startup.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Durations, retry ceilings, and poll cadences governing daemon behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// How often a processing daemon reconnects to the catalog to re-read
    /// its worker-capacity configuration.
    pub db_connect_frequency: Duration,
    /// How often a live worker writes its heartbeat.
    pub db_heartbeat_frequency: Duration,
    /// A `processing` case whose heartbeat is older than this is considered
    /// abandoned and becomes claimable again.
    pub db_heartbeat_dead: Duration,
    /// Sleep between daemon main-loop iterations when there is no work.
    pub daemon_pause: Duration,
    /// A case that has failed this many times moves to a terminal `error`
    /// status instead of being retried.
    pub max_attempts: u32,
    /// Poll interval for the status GUI/CLI `report` command.
    pub gui_refresh_interval: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            db_connect_frequency: Duration::from_secs(30),
            db_heartbeat_frequency: Duration::from_secs(60),
            db_heartbeat_dead: Duration::from_secs(120),
            daemon_pause: Duration::from_secs(2),
            max_attempts: 3,
            gui_refresh_interval: Duration::from_millis(500),
        }
    }
}

impl TimingConfig {
    pub fn db_heartbeat_dead_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.db_heartbeat_dead)
            .unwrap_or_else(|_| chrono::Duration::seconds(120))
    }
}

#[cfg(test)]
#[path = "timing_tests.rs"]
mod tests;
