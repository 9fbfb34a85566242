// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatch task
//!
//! A single tokio task ticks at the configured interval and runs one
//! dispatch cycle per tick. It holds only a weak reference to the broker, so
//! dropping the last broker handle ends the task at the next tick.

use crate::broker::Inner;
use crate::error::BrokerError;
use evboard_core::Clock;
use std::sync::Weak;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, Instrument};

/// Result of one dispatch cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Reference time of the cycle
    pub now: u64,
    /// Log length snapshotted at the start of the cycle
    pub log_len: usize,
    /// Matching events summed over all subscriptions
    pub delivered: usize,
    /// Number of `on_events` calls
    pub notified: usize,
}

pub(crate) struct DispatchTask {
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl DispatchTask {
    pub(crate) fn spawn<C: Clock>(
        inner: Weak<Inner<C>>,
        interval: Duration,
        span: tracing::Span,
    ) -> Result<Self, BrokerError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| BrokerError::NoRuntime)?;
        let (shutdown, mut stop_rx) = oneshot::channel();
        let interval = interval.max(Duration::from_millis(1));

        let handle = runtime.spawn(
            async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    tokio::select! {
                        _ = &mut stop_rx => break,
                        _ = ticker.tick() => {
                            let Some(inner) = inner.upgrade() else {
                                break;
                            };
                            inner.dispatch_if_running();
                        }
                    }
                }
                debug!("dispatch task exited");
            }
            .instrument(span),
        );

        Ok(Self {
            shutdown: Some(shutdown),
            handle,
        })
    }

    /// Ask the task to exit after its current tick
    pub(crate) fn signal(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }

    /// Signal and wait for the task to exit
    pub(crate) async fn join(mut self) {
        self.signal();
        let _ = (&mut self.handle).await;
    }
}

impl Drop for DispatchTask {
    fn drop(&mut self) {
        self.signal();
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
