use std::time::Instant;

use parking_lot::Mutex;
use sysinfo::{
    CpuRefreshKind, Disks, MemoryRefreshKind, Networks, ProcessRefreshKind, ProcessesToUpdate,
    RefreshKind, System,
};

use super::alerts::{VolumeProbe, VolumeUsage};
use super::metrics::*;
use crate::error::Result;

/// Produces fresh samples of one metric kind.
///
/// `initialize` primes counters that need a previous reading; `collect` is
/// called once per tick and may fail, in which case the tick is skipped.
pub trait MetricCollector<T>: Send {
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    fn collect(&mut self) -> Result<T>;
}

fn elapsed_secs(last: Option<Instant>, now: Instant) -> f64 {
    last.map(|t| now.duration_since(t).as_secs_f64())
        .filter(|secs| *secs > 0.0)
        .unwrap_or(1.0)
}

/// Global and per-core CPU usage
pub struct CpuCollector {
    system: System,
    last_refresh: Option<Instant>,
}

impl CpuCollector {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing().with_cpu(CpuRefreshKind::everything());
        Self {
            system: System::new_with_specifics(refresh_kind),
            last_refresh: None,
        }
    }
}

impl Default for CpuCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricCollector<CpuSample> for CpuCollector {
    fn initialize(&mut self) -> Result<()> {
        self.system.refresh_cpu_usage();
        self.last_refresh = Some(Instant::now());
        Ok(())
    }

    fn collect(&mut self) -> Result<CpuSample> {
        // Usage is computed between two refreshes, which must be far enough apart.
        if let Some(last) = self.last_refresh {
            let since = last.elapsed();
            if since < sysinfo::MINIMUM_CPU_UPDATE_INTERVAL {
                std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL - since);
            }
        }

        self.system.refresh_cpu_usage();
        self.last_refresh = Some(Instant::now());

        Ok(CpuSample::new(
            self.system.global_cpu_usage(),
            self.system.cpus().iter().map(|cpu| cpu.cpu_usage()).collect(),
        ))
    }
}

/// Physical memory usage
pub struct MemoryCollector {
    system: System,
}

impl MemoryCollector {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing().with_memory(MemoryRefreshKind::everything());
        Self {
            system: System::new_with_specifics(refresh_kind),
        }
    }
}

impl Default for MemoryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricCollector<MemorySample> for MemoryCollector {
    fn collect(&mut self) -> Result<MemorySample> {
        self.system.refresh_memory();

        Ok(MemorySample::new(
            self.system.total_memory(),
            self.system.used_memory(),
            self.system.available_memory(),
        ))
    }
}

/// System-wide disk throughput, summed over every process's I/O since the
/// previous refresh.
pub struct DiskIoCollector {
    system: System,
    last_refresh: Option<Instant>,
}

impl DiskIoCollector {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            last_refresh: None,
        }
    }

    fn refresh(&mut self) {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_disk_usage(),
        );
    }
}

impl Default for DiskIoCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricCollector<DiskSample> for DiskIoCollector {
    fn initialize(&mut self) -> Result<()> {
        self.refresh();
        self.last_refresh = Some(Instant::now());
        Ok(())
    }

    fn collect(&mut self) -> Result<DiskSample> {
        self.refresh();
        let now = Instant::now();
        let elapsed = elapsed_secs(self.last_refresh, now);
        self.last_refresh = Some(now);

        let (read, written) = self
            .system
            .processes()
            .values()
            .map(|process| process.disk_usage())
            .fold((0u64, 0u64), |(read, written), usage| {
                (
                    read.saturating_add(usage.read_bytes),
                    written.saturating_add(usage.written_bytes),
                )
            });

        Ok(DiskSample::new(
            (read as f64 / elapsed) as u64,
            (written as f64 / elapsed) as u64,
        ))
    }
}

/// Download/upload throughput summed over all interfaces
pub struct NetworkCollector {
    networks: Networks,
    last_update: Option<Instant>,
    last_totals: Option<(u64, u64)>,
}

impl NetworkCollector {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
            last_update: None,
            last_totals: None,
        }
    }

    fn totals(&self) -> (u64, u64) {
        self.networks
            .values()
            .fold((0u64, 0u64), |(rx, tx), data| {
                (
                    rx.saturating_add(data.total_received()),
                    tx.saturating_add(data.total_transmitted()),
                )
            })
    }
}

impl Default for NetworkCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricCollector<NetworkSample> for NetworkCollector {
    fn initialize(&mut self) -> Result<()> {
        self.networks.refresh(true);
        self.last_update = Some(Instant::now());
        self.last_totals = Some(self.totals());
        Ok(())
    }

    fn collect(&mut self) -> Result<NetworkSample> {
        self.networks.refresh(true);

        let now = Instant::now();
        let elapsed = elapsed_secs(self.last_update, now);
        let (rx, tx) = self.totals();
        let (prev_rx, prev_tx) = self.last_totals.unwrap_or((rx, tx));

        self.last_update = Some(now);
        self.last_totals = Some((rx, tx));

        // Interfaces can disappear between refreshes, so totals may shrink.
        Ok(NetworkSample::new(
            (rx.saturating_sub(prev_rx) as f64 / elapsed) as u64,
            (tx.saturating_sub(prev_tx) as f64 / elapsed) as u64,
        ))
    }
}

/// Fixed (non-removable) disks reported by the OS
pub struct SystemVolumeProbe {
    disks: Mutex<Disks>,
}

impl SystemVolumeProbe {
    pub fn new() -> Self {
        Self {
            disks: Mutex::new(Disks::new_with_refreshed_list()),
        }
    }
}

impl Default for SystemVolumeProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeProbe for SystemVolumeProbe {
    fn fixed_volumes(&self) -> Result<Vec<VolumeUsage>> {
        let mut disks = self.disks.lock();
        disks.refresh(true);

        Ok(disks
            .iter()
            .filter(|disk| !disk.is_removable() && disk.total_space() > 0)
            .map(|disk| VolumeUsage {
                name: disk.mount_point().to_string_lossy().to_string(),
                total_bytes: disk.total_space(),
                available_bytes: disk.available_space(),
            })
            .collect())
    }
}

/// The four default collectors, one per metric kind
pub struct Collectors {
    pub cpu: Box<dyn MetricCollector<CpuSample>>,
    pub memory: Box<dyn MetricCollector<MemorySample>>,
    pub disk: Box<dyn MetricCollector<DiskSample>>,
    pub network: Box<dyn MetricCollector<NetworkSample>>,
}

impl Collectors {
    /// sysinfo-backed collectors for the local machine
    pub fn system() -> Self {
        Self {
            cpu: Box::new(CpuCollector::new()),
            memory: Box::new(MemoryCollector::new()),
            disk: Box::new(DiskIoCollector::new()),
            network: Box::new(NetworkCollector::new()),
        }
    }
}
