use hostpulse::core::system_monitor::{
    AlertConfiguration, AlertSeverity, AlertType, ApplicationCore, Collectors, CpuSample,
    DiskSample, MemorySample, MetricCollector, NetworkSample, VolumeProbe, VolumeUsage,
};
use hostpulse::{Result, Settings};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

struct Constant<T>(T);

impl<T: Clone + Send> MetricCollector<T> for Constant<T> {
    fn collect(&mut self) -> Result<T> {
        Ok(self.0.clone())
    }
}

struct FullDisk;

impl VolumeProbe for FullDisk {
    fn fixed_volumes(&self) -> Result<Vec<VolumeUsage>> {
        Ok(vec![VolumeUsage {
            name: "/data".to_string(),
            total_bytes: 100,
            available_bytes: 2,
        }])
    }
}

fn busy_machine() -> Collectors {
    Collectors {
        cpu: Box::new(Constant(CpuSample::new(95.0, vec![95.0, 95.0]))),
        memory: Box::new(Constant(MemorySample::new(1000, 200, 800))),
        disk: Box::new(Constant(DiskSample::new(4096, 1024))),
        network: Box::new(Constant(NetworkSample::new(500, 50))),
    }
}

fn settings() -> Settings {
    Settings {
        refresh_interval_ms: 40,
        history_size: 8,
        thresholds: AlertConfiguration {
            cpu_threshold_duration_secs: 2,
            ..Default::default()
        },
    }
}

#[test]
fn test_updates_reach_cache_bus_and_alerts() {
    let core = ApplicationCore::with_parts(settings(), busy_machine(), Box::new(FullDisk)).unwrap();

    let cpu_events = Arc::new(AtomicUsize::new(0));
    let network_events = Arc::new(AtomicUsize::new(0));
    let alerts = Arc::new(Mutex::new(Vec::new()));
    let severities = Arc::new(Mutex::new(Vec::new()));

    let counter = Arc::clone(&cpu_events);
    core.event_bus().subscribe_cpu(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let counter = Arc::clone(&network_events);
    core.event_bus().subscribe_network(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let sink = Arc::clone(&alerts);
    core.alerts().on_alert(move |alert| sink.lock().push(alert.alert_type));
    let sink = Arc::clone(&severities);
    core.alerts()
        .on_severity_changed(move |severity| sink.lock().push(*severity));

    core.start();
    assert!(core.is_running());
    thread::sleep(Duration::from_millis(500));
    core.stop();
    assert!(!core.is_running());

    assert!(cpu_events.load(Ordering::SeqCst) >= 2);
    assert!(network_events.load(Ordering::SeqCst) >= 1);

    assert_eq!(core.current_cpu().map(|s| s.total_usage_percent), Some(95.0));
    assert_eq!(core.current_network().map(|s| s.download_bytes_per_sec), Some(500));
    assert!(core.cpu_history().len() <= 8);
    assert!(!core.memory_history().is_empty());
    assert!(!core.disk_history().is_empty());

    // One alert per type within the cooldown
    let alerts = alerts.lock();
    assert_eq!(alerts.iter().filter(|t| **t == AlertType::CpuHigh).count(), 1);
    assert_eq!(alerts.iter().filter(|t| **t == AlertType::DiskAlmostFull).count(), 1);
    assert!(!alerts.contains(&AlertType::MemoryHigh));

    assert_eq!(*severities.lock(), vec![AlertSeverity::Warning]);
    assert_eq!(core.alerts().current_severity(), AlertSeverity::Warning);
}

#[test]
fn test_cache_history_matches_bus_order() {
    let core = ApplicationCore::with_parts(settings(), busy_machine(), Box::new(FullDisk)).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    core.event_bus()
        .subscribe_memory(move |sample| sink.lock().push(sample.timestamp));

    core.start();
    thread::sleep(Duration::from_millis(250));
    core.stop();
    // Let an in-flight tick finish publishing
    thread::sleep(Duration::from_millis(50));

    let history: Vec<_> = core.memory_history().iter().map(|s| s.timestamp).collect();
    let seen = seen.lock();
    assert!(!history.is_empty());
    assert!(seen.ends_with(&history));
}

#[test]
fn test_restart_after_stop() {
    let core = ApplicationCore::with_parts(settings(), busy_machine(), Box::new(FullDisk)).unwrap();

    core.start();
    thread::sleep(Duration::from_millis(100));
    core.stop();
    let before = core.cpu_history().len();

    core.start();
    thread::sleep(Duration::from_millis(150));
    core.stop();

    let after = core.cpu_history().len();
    assert!(after > before || after == 8);
}
