//! Heartbeat watchdog.
//!
//! The board disables every output once [`BOARD_TIMEOUT`] passes without a
//! heartbeat. [`Watchdog`] keeps it alive by sending one every period from a
//! background task.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use pkone_domain::command::Command;

use crate::ports::CommandSink;

/// Default heartbeat period.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(500);

/// Silence after which the board disables its outputs.
pub const BOARD_TIMEOUT: Duration = Duration::from_millis(1000);

/// Periodically sends [`Command::Heartbeat`] through a [`CommandSink`].
///
/// Dropping the watchdog stops the background task.
#[derive(Debug)]
pub struct Watchdog {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

impl Watchdog {
    /// A stopped watchdog ticking every `period` once started.
    ///
    /// A zero period falls back to [`DEFAULT_PERIOD`].
    #[must_use]
    pub fn new(period: Duration) -> Self {
        let period = if period.is_zero() {
            DEFAULT_PERIOD
        } else {
            period
        };
        Self { period, task: None }
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Start ticking. The first heartbeat goes out immediately.
    ///
    /// Returns `false` without doing anything when already running.
    /// Must be called from within a tokio runtime.
    pub fn start<S>(&mut self, sink: S) -> bool
    where
        S: CommandSink + Send + Sync + 'static,
    {
        if self.is_running() {
            return false;
        }
        tracing::info!(period_ms = self.period.as_millis(), "watchdog started");
        self.task = Some(tokio::spawn(heartbeat_loop(sink, self.period)));
        true
    }

    /// Stop ticking. Returns whether a running task was stopped.
    pub fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                tracing::info!("watchdog stopped");
                true
            }
            None => false,
        }
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn heartbeat_loop<S: CommandSink>(sink: S, period: Duration) {
    let heartbeat = Command::Heartbeat;
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Err(err) = sink.send(&heartbeat).await {
            tracing::warn!(error = %err, "heartbeat failed, retrying next tick");
        }
    }
}
