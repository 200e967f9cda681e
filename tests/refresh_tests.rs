//! Integration tests for RefreshScheduler timing guarantees
//!
//! All tests run on tokio's paused clock, so "seconds" are virtual.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use devtop::{DashError, RefreshScheduler};

#[tokio::test(start_paused = true)]
async fn test_invocations_bounded_by_elapsed_intervals() {
    let delivered = Arc::new(AtomicUsize::new(0));
    let sink_delivered = Arc::clone(&delivered);

    let mut scheduler = RefreshScheduler::start(
        "bounded",
        Duration::from_millis(100),
        || async { Ok::<_, DashError>(()) },
        move |_| {
            sink_delivered.fetch_add(1, Ordering::SeqCst);
        },
    );

    tokio::time::sleep(Duration::from_millis(1000)).await;
    scheduler.stop();

    // floor(1000 / 100) + 1
    let calls = scheduler.invocations();
    assert!(calls <= 11, "too many invocations: {}", calls);
    assert!(calls >= 10, "too few invocations: {}", calls);
    assert!(delivered.load(Ordering::SeqCst) as u64 <= calls);
}

#[tokio::test(start_paused = true)]
async fn test_slow_producer_never_overlaps() {
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let (producer_running, producer_peak) = (Arc::clone(&running), Arc::clone(&peak));
    let mut scheduler = RefreshScheduler::start(
        "overlap",
        Duration::from_millis(50),
        move || {
            let running = Arc::clone(&producer_running);
            let peak = Arc::clone(&producer_peak);
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(180)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, DashError>(())
            }
        },
        |_| {},
    );

    tokio::time::sleep(Duration::from_secs(2)).await;
    scheduler.stop();

    assert_eq!(peak.load(Ordering::SeqCst), 1);
    assert!(scheduler.skipped_ticks() > 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_prevents_further_invocations() {
    let mut scheduler = RefreshScheduler::start(
        "stopped",
        Duration::from_millis(100),
        || async { Ok::<_, DashError>(()) },
        |_| {},
    );

    tokio::time::sleep(Duration::from_millis(250)).await;
    scheduler.stop();
    let calls = scheduler.invocations();

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(scheduler.invocations(), calls);
    assert!(scheduler.is_stopped());
}
