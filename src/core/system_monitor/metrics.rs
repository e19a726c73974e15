use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A measurement that carries its capture time.
///
/// The scheduler stamps every sample at collection time so that history
/// timestamps never go backwards, even if the wall clock does.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
    fn set_timestamp(&mut self, at: DateTime<Utc>);
}

/// The four sampled metric kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    Cpu,
    Memory,
    Disk,
    Network,
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MetricKind::Cpu => "cpu",
            MetricKind::Memory => "memory",
            MetricKind::Disk => "disk",
            MetricKind::Network => "network",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuSample {
    pub timestamp: DateTime<Utc>,
    pub total_usage_percent: f32,
    pub per_core_usage: Vec<f32>,
}

impl CpuSample {
    pub fn new(total_usage_percent: f32, per_core_usage: Vec<f32>) -> Self {
        Self {
            timestamp: Utc::now(),
            total_usage_percent,
            per_core_usage,
        }
    }

    pub fn value(&self) -> f64 {
        self.total_usage_percent as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySample {
    pub timestamp: DateTime<Utc>,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
    pub usage_percent: f32,
}

impl MemorySample {
    /// Usage percent is derived from `used / total`, and is 0 when total is 0.
    pub fn new(total_bytes: u64, used_bytes: u64, available_bytes: u64) -> Self {
        let usage_percent = if total_bytes > 0 {
            (used_bytes as f64 / total_bytes as f64 * 100.0) as f32
        } else {
            0.0
        };

        Self {
            timestamp: Utc::now(),
            total_bytes,
            used_bytes,
            available_bytes,
            usage_percent,
        }
    }

    pub fn value(&self) -> f64 {
        self.usage_percent as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskSample {
    pub timestamp: DateTime<Utc>,
    pub read_bytes_per_sec: u64,
    pub write_bytes_per_sec: u64,
}

impl DiskSample {
    pub fn new(read_bytes_per_sec: u64, write_bytes_per_sec: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            read_bytes_per_sec,
            write_bytes_per_sec,
        }
    }

    pub fn value(&self) -> f64 {
        self.read_bytes_per_sec.saturating_add(self.write_bytes_per_sec) as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSample {
    pub timestamp: DateTime<Utc>,
    pub download_bytes_per_sec: u64,
    pub upload_bytes_per_sec: u64,
}

impl NetworkSample {
    pub fn new(download_bytes_per_sec: u64, upload_bytes_per_sec: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            download_bytes_per_sec,
            upload_bytes_per_sec,
        }
    }

    pub fn value(&self) -> f64 {
        self.download_bytes_per_sec
            .saturating_add(self.upload_bytes_per_sec) as f64
    }
}

macro_rules! impl_timestamped {
    ($($sample:ty),* $(,)?) => {
        $(
            impl Timestamped for $sample {
                fn timestamp(&self) -> DateTime<Utc> {
                    self.timestamp
                }

                fn set_timestamp(&mut self, at: DateTime<Utc>) {
                    self.timestamp = at;
                }
            }

            impl $sample {
                /// Returns the sample re-stamped at `at`.
                pub fn at(mut self, at: DateTime<Utc>) -> Self {
                    self.timestamp = at;
                    self
                }
            }
        )*
    };
}

impl_timestamped!(CpuSample, MemorySample, DiskSample, NetworkSample);
