//! Owns one scheduler per metric kind and their collectors.

use std::sync::Arc;

use parking_lot::Mutex;

use super::collector::{Collectors, MetricCollector};
use super::events::{SubscriptionId, Subscribers};
use super::metrics::{CpuSample, DiskSample, MemorySample, MetricKind, NetworkSample, Timestamped};
use super::scheduler::MetricScheduler;
use crate::error::Result;

type SharedCollector<T> = Arc<Mutex<Box<dyn MetricCollector<T>>>>;

/// A scheduler together with the collector it polls and the manager-level
/// event it forwards to.
struct KindPipeline<T> {
    kind: MetricKind,
    collector: SharedCollector<T>,
    scheduler: MetricScheduler<T>,
    updated: Arc<Subscribers<T>>,
}

impl<T: Timestamped + Send + Sync + 'static> KindPipeline<T> {
    fn new(
        kind: MetricKind,
        collector: Box<dyn MetricCollector<T>>,
        interval_ms: u64,
        history_size: usize,
    ) -> Result<Self> {
        let collector: SharedCollector<T> = Arc::new(Mutex::new(collector));

        let source = Arc::clone(&collector);
        let scheduler =
            MetricScheduler::new(move || source.lock().collect(), interval_ms, history_size)?;

        let updated = Arc::new(Subscribers::new());
        let forward = Arc::clone(&updated);
        scheduler.subscribe(move |sample: &T| {
            forward.publish(sample);
        });

        Ok(Self {
            kind,
            collector,
            scheduler,
            updated,
        })
    }

    fn initialize(&self) {
        if let Err(e) = self.collector.lock().initialize() {
            log::warn!("Failed to initialize {} collector: {}", self.kind, e);
        }
    }
}

/// Runs the four metric schedulers under one start/stop lifecycle.
pub struct MetricManager {
    cpu: KindPipeline<CpuSample>,
    memory: KindPipeline<MemorySample>,
    disk: KindPipeline<DiskSample>,
    network: KindPipeline<NetworkSample>,
    running: Mutex<bool>,
}

impl MetricManager {
    /// Manager backed by the local machine's collectors.
    pub fn new(interval_ms: u64, history_size: usize) -> Result<Self> {
        Self::with_collectors(Collectors::system(), interval_ms, history_size)
    }

    pub fn with_collectors(
        collectors: Collectors,
        interval_ms: u64,
        history_size: usize,
    ) -> Result<Self> {
        Ok(Self {
            cpu: KindPipeline::new(MetricKind::Cpu, collectors.cpu, interval_ms, history_size)?,
            memory: KindPipeline::new(
                MetricKind::Memory,
                collectors.memory,
                interval_ms,
                history_size,
            )?,
            disk: KindPipeline::new(MetricKind::Disk, collectors.disk, interval_ms, history_size)?,
            network: KindPipeline::new(
                MetricKind::Network,
                collectors.network,
                interval_ms,
                history_size,
            )?,
            running: Mutex::new(false),
        })
    }

    /// Prime every collector. Failures are logged; the affected kind will
    /// simply skip ticks until its collector recovers.
    pub fn initialize(&self) {
        self.cpu.initialize();
        self.memory.initialize();
        self.disk.initialize();
        self.network.initialize();
    }

    /// Initialize collectors and start all schedulers. No-op if running.
    pub fn start(&self) {
        let mut running = self.running.lock();
        if *running {
            return;
        }

        self.initialize();

        self.cpu.scheduler.start();
        self.memory.scheduler.start();
        self.disk.scheduler.start();
        self.network.scheduler.start();

        *running = true;
        log::info!("Metric collection started");
    }

    /// Stop all schedulers. No-op if stopped.
    pub fn stop(&self) {
        let mut running = self.running.lock();
        if !*running {
            return;
        }

        self.cpu.scheduler.stop();
        self.memory.scheduler.stop();
        self.disk.scheduler.stop();
        self.network.scheduler.stop();

        *running = false;
        log::info!("Metric collection stopped");
    }

    pub fn is_running(&self) -> bool {
        *self.running.lock()
    }

    /// Stop collection and release schedulers and collectors.
    pub fn shutdown(self) {
        self.stop();
    }

    pub fn on_cpu_updated<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&CpuSample) + Send + Sync + 'static,
    {
        self.cpu.updated.subscribe(callback)
    }

    pub fn on_memory_updated<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&MemorySample) + Send + Sync + 'static,
    {
        self.memory.updated.subscribe(callback)
    }

    pub fn on_disk_updated<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DiskSample) + Send + Sync + 'static,
    {
        self.disk.updated.subscribe(callback)
    }

    pub fn on_network_updated<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&NetworkSample) + Send + Sync + 'static,
    {
        self.network.updated.subscribe(callback)
    }

    pub fn current_cpu(&self) -> Option<Arc<CpuSample>> {
        self.cpu.scheduler.current()
    }

    pub fn current_memory(&self) -> Option<Arc<MemorySample>> {
        self.memory.scheduler.current()
    }

    pub fn current_disk(&self) -> Option<Arc<DiskSample>> {
        self.disk.scheduler.current()
    }

    pub fn current_network(&self) -> Option<Arc<NetworkSample>> {
        self.network.scheduler.current()
    }

    pub fn cpu_history(&self) -> Vec<Arc<CpuSample>> {
        self.cpu.scheduler.history()
    }

    pub fn memory_history(&self) -> Vec<Arc<MemorySample>> {
        self.memory.scheduler.history()
    }

    pub fn disk_history(&self) -> Vec<Arc<DiskSample>> {
        self.disk.scheduler.history()
    }

    pub fn network_history(&self) -> Vec<Arc<NetworkSample>> {
        self.network.scheduler.history()
    }
}

impl Drop for MetricManager {
    fn drop(&mut self) {
        self.stop();
    }
}
