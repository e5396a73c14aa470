// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded multi-producer, single-consumer event queue.
//!
//! Producers never block on the UI: [`EventBus::send`] is a fire-and-forget
//! call that falls back to the `tracing` log sink when the channel is full
//! or no consumer has been attached yet.

use crate::event::GridEvent;
use thiserror::Error;
use tokio::sync::mpsc;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum EventBusError {
    #[error("event bus consumer has gone away")]
    Closed,
}

/// Producer handle. Cheaply `Clone`-able; every daemon task and worker
/// supervisor holds one.
#[derive(Clone)]
pub struct EventBus {
    tx: mpsc::Sender<GridEvent>,
}

/// Consumer handle, held by the UI (or, in tests, by whatever drains events).
pub struct EventReader {
    rx: mpsc::Receiver<GridEvent>,
}

impl EventBus {
    pub fn new() -> (Self, EventReader) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        (Self { tx }, EventReader { rx })
    }

    /// Send an event. Logs and drops the event rather than returning an
    /// error when the channel is full or the consumer has disconnected —
    /// per the bus's fire-and-forget contract, nothing upstream should ever
    /// block or fail because the UI isn't listening.
    pub fn send(&self, event: GridEvent) {
        Self::log(&event);
        if let Err(mpsc::error::TrySendError::Full(event)) = self.tx.try_send(event) {
            tracing::warn!("event bus full, dropping event");
            Self::log(&event);
        }
    }

    fn log(event: &GridEvent) {
        match event {
            GridEvent::Log(msg) => tracing::debug!(%msg, "event"),
            GridEvent::Info(msg) => tracing::info!(%msg, "event"),
            GridEvent::Warning(msg) => tracing::warn!(%msg, "event"),
            GridEvent::Error(msg) => tracing::error!(%msg, "event"),
            GridEvent::Critical(msg) => tracing::error!(%msg, "critical event"),
            _ => {}
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new().0
    }
}

impl EventReader {
    pub async fn recv(&mut self) -> Option<GridEvent> {
        self.rx.recv().await
    }

    /// Drain one already-buffered event without waiting for the next send.
    pub fn try_recv(&mut self) -> Option<GridEvent> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
