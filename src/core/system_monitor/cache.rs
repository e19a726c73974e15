//! Fan-in cache holding the latest value and recent history of every kind.

use std::sync::Arc;

use parking_lot::RwLock;

use super::history::{RingBuffer, DEFAULT_HISTORY_SIZE};
use super::metrics::{CpuSample, DiskSample, MemorySample, NetworkSample};
use crate::error::Result;

struct KindStore<T> {
    current: Option<Arc<T>>,
    history: RingBuffer<Arc<T>>,
}

/// Current value plus bounded history for one kind, behind its own lock.
struct KindSlot<T> {
    inner: RwLock<KindStore<T>>,
}

impl<T> KindSlot<T> {
    fn new(history_size: usize) -> Result<Self> {
        Ok(Self {
            inner: RwLock::new(KindStore {
                current: None,
                history: RingBuffer::new(history_size)?,
            }),
        })
    }

    fn with_default_size() -> Self {
        Self {
            inner: RwLock::new(KindStore {
                current: None,
                history: RingBuffer::default(),
            }),
        }
    }

    fn update(&self, sample: Arc<T>) {
        let mut store = self.inner.write();
        store.current = Some(Arc::clone(&sample));
        store.history.push(sample);
    }

    fn current(&self) -> Option<Arc<T>> {
        self.inner.read().current.clone()
    }

    fn history(&self) -> Vec<Arc<T>> {
        self.inner.read().history.snapshot()
    }

    fn clear(&self) {
        let mut store = self.inner.write();
        store.current = None;
        store.history.clear();
    }
}

/// Thread-safe snapshot of all four metric kinds.
///
/// Each kind has independent storage, so writers for different kinds never
/// contend, and readers always observe a whole update or none of it.
pub struct MetricCache {
    history_size: usize,
    cpu: KindSlot<CpuSample>,
    memory: KindSlot<MemorySample>,
    disk: KindSlot<DiskSample>,
    network: KindSlot<NetworkSample>,
}

impl MetricCache {
    pub fn new(history_size: usize) -> Result<Self> {
        Ok(Self {
            history_size,
            cpu: KindSlot::new(history_size)?,
            memory: KindSlot::new(history_size)?,
            disk: KindSlot::new(history_size)?,
            network: KindSlot::new(history_size)?,
        })
    }

    pub fn history_size(&self) -> usize {
        self.history_size
    }

    pub fn update_cpu(&self, sample: impl Into<Arc<CpuSample>>) {
        self.cpu.update(sample.into());
    }

    pub fn update_memory(&self, sample: impl Into<Arc<MemorySample>>) {
        self.memory.update(sample.into());
    }

    pub fn update_disk(&self, sample: impl Into<Arc<DiskSample>>) {
        self.disk.update(sample.into());
    }

    pub fn update_network(&self, sample: impl Into<Arc<NetworkSample>>) {
        self.network.update(sample.into());
    }

    pub fn current_cpu(&self) -> Option<Arc<CpuSample>> {
        self.cpu.current()
    }

    pub fn current_memory(&self) -> Option<Arc<MemorySample>> {
        self.memory.current()
    }

    pub fn current_disk(&self) -> Option<Arc<DiskSample>> {
        self.disk.current()
    }

    pub fn current_network(&self) -> Option<Arc<NetworkSample>> {
        self.network.current()
    }

    pub fn cpu_history(&self) -> Vec<Arc<CpuSample>> {
        self.cpu.history()
    }

    pub fn memory_history(&self) -> Vec<Arc<MemorySample>> {
        self.memory.history()
    }

    pub fn disk_history(&self) -> Vec<Arc<DiskSample>> {
        self.disk.history()
    }

    pub fn network_history(&self) -> Vec<Arc<NetworkSample>> {
        self.network.history()
    }

    /// Reset every kind to empty. Not meant to race with updates.
    pub fn clear(&self) {
        self.cpu.clear();
        self.memory.clear();
        self.disk.clear();
        self.network.clear();
    }
}

impl Default for MetricCache {
    fn default() -> Self {
        Self {
            history_size: DEFAULT_HISTORY_SIZE,
            cpu: KindSlot::with_default_size(),
            memory: KindSlot::with_default_size(),
            disk: KindSlot::with_default_size(),
            network: KindSlot::with_default_size(),
        }
    }
}
