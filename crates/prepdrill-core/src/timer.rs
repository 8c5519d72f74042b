//! Wall-clock attempt timing.
//!
//! The timer is pure sampling: it never pauses, so elapsed time keeps
//! accruing through idle gaps, reflecting real think-time. The 1 Hz
//! observation stream is a spawned task whose lifetime is tied to the
//! [`Ticker`] handle, so no periodic callback outlives the attempt.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Interval between elapsed-time observations published by a [`Ticker`].
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct TimerState {
    started_at: Instant,
    started_wall: DateTime<Utc>,
}

/// Wall-clock elapsed-time tracker for the active attempt.
///
/// Cloning yields a handle to the same underlying clock, which is how the
/// ticker task observes resets.
#[derive(Debug, Clone)]
pub struct AttemptTimer {
    inner: Arc<Mutex<TimerState>>,
}

impl AttemptTimer {
    /// Start a new timer at now.
    pub fn start() -> Self {
        Self {
            inner: Arc::new(Mutex::new(TimerState {
                started_at: Instant::now(),
                started_wall: Utc::now(),
            })),
        }
    }

    /// Wall-clock timestamp the attempt began.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.lock().unwrap().started_wall
    }

    /// Elapsed time since start (or the last reset).
    pub fn elapsed(&self) -> Duration {
        self.inner.lock().unwrap().started_at.elapsed()
    }

    /// Elapsed whole seconds.
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed().as_secs()
    }

    /// Re-arm the timer at now.
    pub fn reset(&self) {
        let mut state = self.inner.lock().unwrap();
        state.started_at = Instant::now();
        state.started_wall = Utc::now();
    }

    /// Spawn the ≈1 Hz observation stream of elapsed seconds.
    pub fn ticker(&self) -> Ticker {
        let (tx, rx) = watch::channel(self.elapsed_seconds());
        let timer = self.clone();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_PERIOD);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if tx.send(timer.elapsed_seconds()).is_err() {
                    break;
                }
            }
        });
        Ticker { rx, task }
    }
}

/// Handle to the periodic elapsed-seconds stream. Dropping it aborts the
/// publishing task.
#[derive(Debug)]
pub struct Ticker {
    rx: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl Ticker {
    /// Latest observed elapsed seconds.
    pub fn latest(&self) -> u64 {
        *self.rx.borrow()
    }

    /// Wait for the next published observation.
    pub async fn next(&mut self) -> u64 {
        let _ = self.rx.changed().await;
        *self.rx.borrow()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
