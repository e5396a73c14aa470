// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured logging init, shared by every `gridctl` subcommand that runs a
//! daemon loop.

use tracing_subscriber::EnvFilter;

/// Installs a `tracing-subscriber` fmt layer reading `RUST_LOG`, defaulting
/// to `info` when unset. Idempotent: a second call is a harmless no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
