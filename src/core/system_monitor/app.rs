//! Application composition root.
//!
//! Every manager update is routed to the cache, then the event bus, then
//! the alert service.

use std::sync::Arc;

use super::alerts::{AlertService, VolumeProbe};
use super::cache::MetricCache;
use super::collector::{Collectors, SystemVolumeProbe};
use super::events::EventBus;
use super::manager::MetricManager;
use super::metrics::{CpuSample, DiskSample, MemorySample, NetworkSample};
use crate::core::config::Settings;
use crate::error::Result;

pub struct ApplicationCore {
    settings: Settings,
    manager: MetricManager,
    cache: Arc<MetricCache>,
    event_bus: Arc<EventBus>,
    alerts: Arc<AlertService>,
}

impl ApplicationCore {
    /// Build the engine for the local machine.
    pub fn new(settings: Settings) -> Result<Self> {
        Self::with_parts(
            settings,
            Collectors::system(),
            Box::new(SystemVolumeProbe::new()),
        )
    }

    pub fn with_parts(
        settings: Settings,
        collectors: Collectors,
        volumes: Box<dyn VolumeProbe>,
    ) -> Result<Self> {
        settings.validate()?;

        let manager = MetricManager::with_collectors(
            collectors,
            settings.refresh_interval_ms,
            settings.history_size,
        )?;
        let cache = Arc::new(MetricCache::new(settings.history_size)?);
        let event_bus = Arc::new(EventBus::new());
        let alerts = Arc::new(AlertService::with_probe(
            settings.thresholds.clone(),
            volumes,
        ));

        {
            let (cache, bus, alerts) = (cache.clone(), event_bus.clone(), alerts.clone());
            manager.on_cpu_updated(move |sample: &CpuSample| {
                cache.update_cpu(sample.clone());
                bus.publish_cpu(sample);
                alerts.check_cpu(sample);
            });
        }
        {
            let (cache, bus, alerts) = (cache.clone(), event_bus.clone(), alerts.clone());
            manager.on_memory_updated(move |sample: &MemorySample| {
                cache.update_memory(sample.clone());
                bus.publish_memory(sample);
                alerts.check_memory(sample);
            });
        }
        {
            let (cache, bus, alerts) = (cache.clone(), event_bus.clone(), alerts.clone());
            manager.on_disk_updated(move |sample: &DiskSample| {
                cache.update_disk(sample.clone());
                bus.publish_disk(sample);
                alerts.check_disk(sample);
            });
        }
        {
            let (cache, bus) = (cache.clone(), event_bus.clone());
            manager.on_network_updated(move |sample: &NetworkSample| {
                cache.update_network(sample.clone());
                bus.publish_network(sample);
            });
        }

        Ok(Self {
            settings,
            manager,
            cache,
            event_bus,
            alerts,
        })
    }

    pub fn start(&self) {
        self.manager.start();
    }

    pub fn stop(&self) {
        self.manager.stop();
    }

    pub fn is_running(&self) -> bool {
        self.manager.is_running()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    pub fn cache(&self) -> &Arc<MetricCache> {
        &self.cache
    }

    pub fn alerts(&self) -> &Arc<AlertService> {
        &self.alerts
    }

    pub fn current_cpu(&self) -> Option<Arc<CpuSample>> {
        self.cache.current_cpu()
    }

    pub fn current_memory(&self) -> Option<Arc<MemorySample>> {
        self.cache.current_memory()
    }

    pub fn current_disk(&self) -> Option<Arc<DiskSample>> {
        self.cache.current_disk()
    }

    pub fn current_network(&self) -> Option<Arc<NetworkSample>> {
        self.cache.current_network()
    }

    pub fn cpu_history(&self) -> Vec<Arc<CpuSample>> {
        self.cache.cpu_history()
    }

    pub fn memory_history(&self) -> Vec<Arc<MemorySample>> {
        self.cache.memory_history()
    }

    pub fn disk_history(&self) -> Vec<Arc<DiskSample>> {
        self.cache.disk_history()
    }

    pub fn network_history(&self) -> Vec<Arc<NetworkSample>> {
        self.cache.network_history()
    }
}
