//! Timer layer over [`LagValue`].
//!
//! `LagTimer` owns a value source, a broadcast event channel, and at most
//! one pending completion timer. When a transition's effective duration
//! elapses it broadcasts [`Event::TargetReached`] exactly once, whether or
//! not anyone ever polled `get`. Requires a running tokio runtime.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Interval, MissedTickBehavior};

use super::value::{now_ms, LagConfig, LagValue};
use crate::error::Result;
use crate::events::Event;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Time-lagged value source with scheduled completion notifications.
#[derive(Debug)]
pub struct LagTimer {
    value: LagValue,
    events: broadcast::Sender<Event>,
    /// Pending completion timer for the current transition, if any.
    target_task: Option<JoinHandle<()>>,
}

impl LagTimer {
    pub fn new(config: LagConfig) -> Result<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            value: LagValue::new(config)?,
            events,
            target_task: None,
        })
    }

    /// Create and immediately begin a transition, as if `set` were called.
    pub fn with_initial(
        config: LagConfig,
        start_value: f64,
        stop_value: f64,
        ts_ms: Option<f64>,
    ) -> Result<Self> {
        let mut timer = Self::new(config)?;
        timer.set(start_value, stop_value, ts_ms)?;
        Ok(timer)
    }

    /// Subscribe to completion notifications. Any number of subscribers may
    /// listen; events sent while nobody listens are discarded.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// The underlying interpolation state.
    pub fn value(&self) -> &LagValue {
        &self.value
    }

    /// Interpolated value at `ts_ms`, or at the wall clock when omitted.
    /// `None` until the first `set`.
    pub fn get(&self, ts_ms: Option<f64>) -> Option<f64> {
        self.value.get(ts_ms)
    }

    /// Begin a new transition, superseding the previous one.
    ///
    /// Any pending completion timer from the prior transition is aborted
    /// before the new one is scheduled, so `TargetReached` fires at most
    /// once per transition. Abortion is best-effort: a timer already firing
    /// on another worker may still deliver its event.
    pub fn set(&mut self, start_value: f64, stop_value: f64, ts_ms: Option<f64>) -> Result<()> {
        self.value.set(start_value, stop_value, ts_ms)?;
        if let Some(task) = self.target_task.take() {
            task.abort();
        }
        self.target_task = Some(self.schedule_target(start_value, stop_value));
        Ok(())
    }

    /// Run a transition to completion, reporting progress along the way.
    ///
    /// Calls `set` with the current time, invokes `on_progress` once
    /// synchronously with the start value, then with the live interpolated
    /// value every `progress_every` until the effective duration elapses.
    /// Periodic ticking stops before the final invocation, which always
    /// carries the exact stop value. Resolves with no payload and never
    /// fails once the transition is accepted.
    ///
    /// Dropping the returned future cancels the periodic reporting; the
    /// completion event scheduled by `set` still fires. Taking `&mut self`
    /// makes a second concurrent run unrepresentable -- superseding an
    /// in-flight run means dropping its future and calling `set` (or this
    /// method) again, which also aborts the stale completion timer.
    pub async fn run_with_progress<F>(
        &mut self,
        start_value: f64,
        stop_value: f64,
        progress_every: Option<Duration>,
        mut on_progress: F,
    ) -> Result<()>
    where
        F: FnMut(f64),
    {
        self.set(start_value, stop_value, None)?;
        on_progress(start_value);

        let effective_ms = self.value.effective_lag_ms().unwrap_or(0.0);
        let done = time::sleep(Duration::from_secs_f64(effective_ms / 1000.0));
        tokio::pin!(done);
        let mut ticker = progress_every.map(|every| {
            let mut interval = time::interval_at(time::Instant::now() + every, every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        loop {
            tokio::select! {
                _ = &mut done => break,
                _ = next_tick(&mut ticker) => {
                    if let Some(value) = self.value.get(None) {
                        on_progress(value);
                    }
                }
            }
        }
        drop(ticker);
        on_progress(stop_value);
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn schedule_target(&self, start_value: f64, stop_value: f64) -> JoinHandle<()> {
        // `set` succeeded, so a transition exists and the effective lag is
        // finite and positive.
        let effective_ms = self.value.effective_lag_ms().unwrap_or(0.0);
        let start_ts = self.value.start_ts_ms().unwrap_or_else(now_ms);
        // An explicit start timestamp may lie in the past; sleep only the
        // remainder of the effective duration.
        let delay_ms = (start_ts + effective_ms - now_ms()).max(0.0);
        let events = self.events.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs_f64(delay_ms / 1000.0)).await;
            // Nobody listening is fine.
            let _ = events.send(Event::TargetReached {
                start_value,
                stop_value,
                at: Utc::now(),
            });
        })
    }
}

impl Drop for LagTimer {
    fn drop(&mut self) {
        if let Some(task) = self.target_task.take() {
            task.abort();
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        // No periodic reporting requested; never wake this select arm.
        None => std::future::pending::<()>().await,
    }
}
