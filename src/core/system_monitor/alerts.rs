//! Alert system for monitoring critical conditions.
//!
//! CPU and memory alerts are debounced: the metric must stay over its
//! threshold for a sustained window before an alert fires. Disk alerts are
//! level-triggered against fixed volumes. Every alert type has a cooldown.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use super::collector::SystemVolumeProbe;
use super::events::{SubscriptionId, Subscribers};
use super::metrics::{CpuSample, DiskSample, MemorySample};
use crate::error::Result;

/// Alert configuration with thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfiguration {
    pub cpu_threshold_percent: f32,
    pub cpu_threshold_duration_secs: u32,
    pub memory_threshold_percent: f32,
    pub memory_threshold_duration_secs: u32,
    pub disk_usage_threshold_percent: f32,
    /// Minimum time between two alerts of the same type
    pub cooldown_secs: u64,
    pub notifications_enabled: bool,
    pub tray_icon_color_change_enabled: bool,
}

impl Default for AlertConfiguration {
    fn default() -> Self {
        Self {
            cpu_threshold_percent: 85.0,
            cpu_threshold_duration_secs: 10,
            memory_threshold_percent: 80.0,
            memory_threshold_duration_secs: 10,
            disk_usage_threshold_percent: 90.0,
            cooldown_secs: 300,
            notifications_enabled: true,
            tray_icon_color_change_enabled: true,
        }
    }
}

const MAX_COOLDOWN_SECS: u64 = i64::MAX as u64 / 1000;

impl AlertConfiguration {
    fn cooldown(&self) -> Duration {
        Duration::seconds(self.cooldown_secs.min(MAX_COOLDOWN_SECS) as i64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertType {
    CpuHigh,
    MemoryHigh,
    DiskAlmostFull,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertSeverity {
    #[default]
    Normal,
    Warning,
    Critical,
}

/// An individual alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub value: f64,
    pub threshold: f64,
    pub timestamp: DateTime<Utc>,
}

/// Space usage of one mounted volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeUsage {
    pub name: String,
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl VolumeUsage {
    pub fn used_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.available_bytes as f64 / self.total_bytes as f64) * 100.0
    }
}

/// Source of fixed local volumes for the disk-full check
pub trait VolumeProbe: Send + Sync {
    fn fixed_volumes(&self) -> Result<Vec<VolumeUsage>>;
}

/// Timestamps of consecutive over-threshold observations for one alert type.
#[derive(Debug, Default)]
struct SustainedWindow {
    observations: VecDeque<DateTime<Utc>>,
    last_alert: Option<DateTime<Utc>>,
}

impl SustainedWindow {
    /// Record one observation and report whether an alert should fire.
    fn observe(
        &mut self,
        now: DateTime<Utc>,
        over_threshold: bool,
        duration_secs: u32,
        cooldown: Duration,
    ) -> bool {
        let cutoff = now - Duration::seconds(i64::from(duration_secs));
        while self.observations.front().is_some_and(|&t| t < cutoff) {
            self.observations.pop_front();
        }

        if !over_threshold {
            // Any dip below the threshold restarts the sustained count.
            self.observations.clear();
            return false;
        }

        self.observations.push_back(now);

        if self.is_sustained(duration_secs) && cooled_down(self.last_alert, now, cooldown) {
            self.last_alert = Some(now);
            return true;
        }
        false
    }

    /// One observation per second is expected, so the window is satisfied
    /// once it holds `duration_secs` entries.
    fn is_sustained(&self, duration_secs: u32) -> bool {
        self.observations.len() >= duration_secs.max(1) as usize
    }
}

fn cooled_down(last_alert: Option<DateTime<Utc>>, now: DateTime<Utc>, cooldown: Duration) -> bool {
    match last_alert {
        Some(last) => now - last > cooldown,
        None => true,
    }
}

#[derive(Debug, Default)]
struct AlertState {
    cpu: SustainedWindow,
    memory: SustainedWindow,
    last_disk_alert: Option<DateTime<Utc>>,
    severity: AlertSeverity,
}

impl AlertState {
    /// Returns the new severity if it changed.
    fn recompute_severity(&mut self, config: &AlertConfiguration) -> Option<AlertSeverity> {
        let severity = if self.cpu.is_sustained(config.cpu_threshold_duration_secs)
            || self.memory.is_sustained(config.memory_threshold_duration_secs)
        {
            AlertSeverity::Warning
        } else {
            AlertSeverity::Normal
        };

        if severity == self.severity {
            return None;
        }
        self.severity = severity;
        Some(severity)
    }
}

/// Sustained-threshold detector with per-type cooldown and an aggregate
/// severity.
///
/// Checks use the sample timestamp as the observation time. Events are
/// emitted after the internal lock is released.
pub struct AlertService {
    config: RwLock<AlertConfiguration>,
    state: Mutex<AlertState>,
    volumes: Box<dyn VolumeProbe>,
    alert_triggered: Subscribers<Alert>,
    severity_changed: Subscribers<AlertSeverity>,
}

impl AlertService {
    /// Create a service that checks the machine's fixed disks.
    pub fn new(config: AlertConfiguration) -> Self {
        Self::with_probe(config, Box::new(SystemVolumeProbe::new()))
    }

    pub fn with_probe(config: AlertConfiguration, volumes: Box<dyn VolumeProbe>) -> Self {
        Self {
            config: RwLock::new(config),
            state: Mutex::new(AlertState::default()),
            volumes,
            alert_triggered: Subscribers::new(),
            severity_changed: Subscribers::new(),
        }
    }

    pub fn configuration(&self) -> AlertConfiguration {
        self.config.read().clone()
    }

    /// Replace the configuration; applies from the next check.
    pub fn set_configuration(&self, config: AlertConfiguration) {
        *self.config.write() = config;
    }

    pub fn current_severity(&self) -> AlertSeverity {
        self.state.lock().severity
    }

    pub fn on_alert<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Alert) + Send + Sync + 'static,
    {
        self.alert_triggered.subscribe(callback)
    }

    pub fn on_severity_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&AlertSeverity) + Send + Sync + 'static,
    {
        self.severity_changed.subscribe(callback)
    }

    pub fn remove_alert_listener(&self, id: SubscriptionId) -> bool {
        self.alert_triggered.unsubscribe(id)
    }

    pub fn remove_severity_listener(&self, id: SubscriptionId) -> bool {
        self.severity_changed.unsubscribe(id)
    }

    pub fn check_cpu(&self, sample: &CpuSample) {
        let config = self.configuration();
        let now = sample.timestamp;
        let value = sample.total_usage_percent;

        let (alert, change) = {
            let mut state = self.state.lock();
            let fired = state.cpu.observe(
                now,
                value >= config.cpu_threshold_percent,
                config.cpu_threshold_duration_secs,
                config.cooldown(),
            );
            let alert = fired.then(|| Alert {
                alert_type: AlertType::CpuHigh,
                severity: AlertSeverity::Warning,
                message: format!(
                    "CPU usage at {:.1}% for {}s (threshold: {:.1}%)",
                    value, config.cpu_threshold_duration_secs, config.cpu_threshold_percent
                ),
                value: value as f64,
                threshold: config.cpu_threshold_percent as f64,
                timestamp: now,
            });
            (alert, state.recompute_severity(&config))
        };

        self.emit(alert, change);
    }

    pub fn check_memory(&self, sample: &MemorySample) {
        let config = self.configuration();
        let now = sample.timestamp;
        let value = sample.usage_percent;

        let (alert, change) = {
            let mut state = self.state.lock();
            let fired = state.memory.observe(
                now,
                value >= config.memory_threshold_percent,
                config.memory_threshold_duration_secs,
                config.cooldown(),
            );
            let alert = fired.then(|| Alert {
                alert_type: AlertType::MemoryHigh,
                severity: AlertSeverity::Warning,
                message: format!(
                    "Memory usage at {:.1}% for {}s (threshold: {:.1}%)",
                    value, config.memory_threshold_duration_secs, config.memory_threshold_percent
                ),
                value: value as f64,
                threshold: config.memory_threshold_percent as f64,
                timestamp: now,
            });
            (alert, state.recompute_severity(&config))
        };

        self.emit(alert, change);
    }

    /// Level-triggered disk-full check against every fixed volume.
    ///
    /// The sample only provides the observation time; volume enumeration
    /// failures skip the check.
    pub fn check_disk(&self, sample: &DiskSample) {
        let config = self.configuration();
        let now = sample.timestamp;

        let volumes = match self.volumes.fixed_volumes() {
            Ok(volumes) => volumes,
            Err(e) => {
                log::debug!("Skipping disk check: {}", e);
                return;
            }
        };

        let threshold = config.disk_usage_threshold_percent as f64;
        let (alert, change) = {
            let mut state = self.state.lock();
            let alert = if cooled_down(state.last_disk_alert, now, config.cooldown()) {
                volumes
                    .iter()
                    .map(|volume| (volume, volume.used_percent()))
                    .find(|(_, used)| *used >= threshold)
                    .map(|(volume, used)| {
                        state.last_disk_alert = Some(now);
                        Alert {
                            alert_type: AlertType::DiskAlmostFull,
                            severity: AlertSeverity::Critical,
                            message: format!(
                                "Disk {} at {:.1}% capacity (threshold: {:.1}%)",
                                volume.name, used, threshold
                            ),
                            value: used,
                            threshold,
                            timestamp: now,
                        }
                    })
            } else {
                None
            };
            (alert, state.recompute_severity(&config))
        };

        self.emit(alert, change);
    }

    fn emit(&self, alert: Option<Alert>, change: Option<AlertSeverity>) {
        if let Some(alert) = alert {
            log::info!("{}", alert.message);
            self.alert_triggered.publish(&alert);
        }
        if let Some(severity) = change {
            log::debug!("Severity changed to {:?}", severity);
            self.severity_changed.publish(&severity);
        }
    }
}
