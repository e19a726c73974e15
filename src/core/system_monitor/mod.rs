//! System monitoring core functionality.
//!
//! Periodic sampling of CPU, memory, disk and network metrics, a shared
//! cache of the latest values, fan-out of updates, and threshold alerts.

pub mod alerts;
pub mod app;
pub mod cache;
pub mod collector;
pub mod events;
pub mod history;
pub mod manager;
mod metrics;
pub mod runtime;
pub mod scheduler;

pub use alerts::{
    Alert, AlertConfiguration, AlertService, AlertSeverity, AlertType, VolumeProbe, VolumeUsage,
};
pub use app::ApplicationCore;
pub use cache::MetricCache;
pub use collector::{
    Collectors, CpuCollector, DiskIoCollector, MemoryCollector, MetricCollector, NetworkCollector,
    SystemVolumeProbe,
};
pub use events::{EventBus, SubscriptionId, Subscribers};
pub use history::{RingBuffer, DEFAULT_HISTORY_SIZE};
pub use manager::MetricManager;
pub use metrics::{
    CpuSample, DiskSample, MemorySample, MetricKind, NetworkSample, Timestamped,
};
pub use scheduler::MetricScheduler;
