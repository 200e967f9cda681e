//! Refresh Scheduler - periodic producer driver shared by every panel
//!
//! ```text
//! tick ──► in_flight? ──yes──► skip (no queueing)
//!              │no
//!              ▼
//!        spawn producer ──► result ──► cancelled? ──yes──► discard
//!                                          │no
//!                                          ▼
//!                                   Ok → sink / Err → log
//! ```
//!
//! The first tick fires immediately. `stop()` aborts the timer task
//! synchronously; a producer that is already running is left to finish but its
//! result never reaches the sink. A producer that panics is logged like an
//! `Err` and the next tick runs normally.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::error::Result;

/// Guard flags shared between the timer loop and in-flight invocations.
#[derive(Debug, Default)]
struct TaskFlags {
    in_flight: AtomicBool,
    cancelled: AtomicBool,
    invocations: AtomicU64,
    skipped: AtomicU64,
    /// Held across the cancelled check and the sink call, and by `stop()`
    delivery: Mutex<()>,
}

/// Clears `in_flight` however the invocation ends, unwinding included.
struct InFlightGuard(Arc<TaskFlags>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::Release);
    }
}

/// Periodic refresh task owned by a single panel.
pub struct RefreshScheduler {
    name: &'static str,
    interval: Duration,
    flags: Arc<TaskFlags>,
    timer: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    /// Start driving `producer` every `interval`, delivering successes to `sink`.
    ///
    /// A zero interval is bumped to 1ms so the timer stays valid.
    pub fn start<P, Fut, T, S>(
        name: &'static str,
        interval: Duration,
        mut producer: P,
        sink: S,
    ) -> Self
    where
        P: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
        S: Fn(T) + Send + Sync + 'static,
    {
        let interval = interval.max(Duration::from_millis(1));
        let flags = Arc::new(TaskFlags::default());
        let sink = Arc::new(sink);

        let loop_flags = Arc::clone(&flags);
        let timer = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if loop_flags.cancelled.load(Ordering::Acquire) {
                    break;
                }
                if loop_flags.in_flight.swap(true, Ordering::AcqRel) {
                    loop_flags.skipped.fetch_add(1, Ordering::Relaxed);
                    tracing::trace!(task = name, "previous refresh still running, tick skipped");
                    continue;
                }

                loop_flags.invocations.fetch_add(1, Ordering::Relaxed);
                let guard = InFlightGuard(Arc::clone(&loop_flags));
                let Ok(fut) = std::panic::catch_unwind(AssertUnwindSafe(&mut producer)) else {
                    tracing::error!(task = name, "refresh panicked");
                    continue;
                };
                let sink = Arc::clone(&sink);
                tokio::spawn(async move {
                    let result = AssertUnwindSafe(fut).catch_unwind().await;
                    let flags = &guard.0;
                    let _delivery = flags.delivery.lock().unwrap_or_else(PoisonError::into_inner);
                    if flags.cancelled.load(Ordering::Acquire) {
                        tracing::trace!(task = name, "scheduler stopped, result discarded");
                        return;
                    }
                    match result {
                        Ok(Ok(value)) => sink(value),
                        Ok(Err(e)) if e.is_transient() => {
                            tracing::warn!(task = name, error = %e, "refresh failed")
                        }
                        Ok(Err(e)) => tracing::error!(task = name, error = %e, "refresh failed"),
                        Err(_) => tracing::error!(task = name, "refresh panicked"),
                    }
                });
            }
        });

        tracing::debug!(task = name, interval_ms = interval.as_millis() as u64, "refresh started");

        Self {
            name,
            interval,
            flags,
            timer: Some(timer),
        }
    }

    /// Cancel the timer and discard any result still in flight.
    ///
    /// Waits for a sink call already in progress, so nothing is delivered
    /// once this returns.
    pub fn stop(&mut self) {
        {
            let _delivery = self.flags.delivery.lock().unwrap_or_else(PoisonError::into_inner);
            self.flags.cancelled.store(true, Ordering::Release);
        }
        if let Some(timer) = self.timer.take() {
            timer.abort();
            tracing::debug!(task = self.name, "refresh stopped");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.flags.cancelled.load(Ordering::Acquire)
    }

    /// True while a producer invocation has not resolved yet.
    pub fn is_in_flight(&self) -> bool {
        self.flags.in_flight.load(Ordering::Acquire)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of producer invocations started so far.
    pub fn invocations(&self) -> u64 {
        self.flags.invocations.load(Ordering::Relaxed)
    }

    /// Number of ticks dropped by the overlap guard.
    pub fn skipped_ticks(&self) -> u64 {
        self.flags.skipped.load(Ordering::Relaxed)
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("stopped", &self.is_stopped())
            .field("in_flight", &self.is_in_flight())
            .finish()
    }
}
