use hostpulse::core::system_monitor::runtime::build_runtime;
use hostpulse::core::system_monitor::{MetricScheduler, NetworkSample};
use hostpulse::{MonitorError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_scheduler_on_dedicated_runtime() {
    let runtime = build_runtime(1).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let scheduler = MetricScheduler::with_handle(
        move || -> Result<NetworkSample> {
            let n = counter.fetch_add(1, Ordering::SeqCst) as u64;
            Ok(NetworkSample::new(n, n))
        },
        50,
        4,
        runtime.handle().clone(),
    )
    .unwrap();

    scheduler.start();
    thread::sleep(Duration::from_millis(320));
    scheduler.stop();

    let history = scheduler.history();
    assert!(!history.is_empty());
    assert!(history.len() <= 4);
    assert_eq!(scheduler.history_capacity(), 4);
    assert_eq!(scheduler.interval(), Duration::from_millis(50));

    // Collection order, newest last
    for pair in history.windows(2) {
        assert!(pair[0].download_bytes_per_sec < pair[1].download_bytes_per_sec);
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}

#[test]
fn test_alternating_failures_keep_running() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let scheduler = MetricScheduler::new(
        move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n % 2 == 0 {
                Err(MonitorError::collection("counter not ready"))
            } else {
                Ok(NetworkSample::new(n as u64, 0))
            }
        },
        30,
        10,
    )
    .unwrap();

    scheduler.start();
    thread::sleep(Duration::from_millis(300));
    scheduler.stop();

    assert!(calls.load(Ordering::SeqCst) >= 4);
    assert!(scheduler
        .history()
        .iter()
        .all(|s| s.download_bytes_per_sec % 2 == 1));
}

#[test]
fn test_zero_interval_rejected() {
    let result = MetricScheduler::new(|| Ok(NetworkSample::new(0, 0)), 0, 10);
    assert!(matches!(result, Err(MonitorError::InvalidConfiguration(_))));
}
