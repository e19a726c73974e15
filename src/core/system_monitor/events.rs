//! Synchronous publish/subscribe fan-out.
//!
//! `Subscribers<T>` is the observer list used by every event source in the
//! crate (schedulers, the manager, the alert service). `EventBus` groups one
//! list per metric kind for external consumers.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::metrics::{CpuSample, DiskSample, MemorySample, NetworkSample};
use crate::error::MonitorError;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Ordered list of callbacks for one event type.
///
/// Callbacks run on the publisher's thread in registration order. The list
/// lock is released before any callback runs, so a callback may subscribe,
/// unsubscribe or stop its own publisher.
pub struct Subscribers<T> {
    next_id: AtomicU64,
    entries: RwLock<Vec<(SubscriptionId, Callback<T>)>>,
}

impl<T> Subscribers<T> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.write().push((id, Arc::new(callback)));
        id
    }

    /// Returns false if the handle was not registered here
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Invoke every callback with `value`.
    ///
    /// A panicking callback is logged and skipped; the remaining callbacks
    /// still run. Returns how many callbacks failed.
    pub fn publish(&self, value: &T) -> usize {
        let callbacks: Vec<Callback<T>> = self
            .entries
            .read()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        let mut failures = 0;
        for callback in callbacks {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(value))) {
                failures += 1;
                let err = MonitorError::subscriber(panic_message(payload.as_ref()));
                log::warn!("{}", err);
            }
        }
        failures
    }
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Typed fan-out channels, one per metric kind
#[derive(Default)]
pub struct EventBus {
    cpu: Subscribers<CpuSample>,
    memory: Subscribers<MemorySample>,
    disk: Subscribers<DiskSample>,
    network: Subscribers<NetworkSample>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish_cpu(&self, sample: &CpuSample) {
        self.cpu.publish(sample);
    }

    pub fn publish_memory(&self, sample: &MemorySample) {
        self.memory.publish(sample);
    }

    pub fn publish_disk(&self, sample: &DiskSample) {
        self.disk.publish(sample);
    }

    pub fn publish_network(&self, sample: &NetworkSample) {
        self.network.publish(sample);
    }

    pub fn subscribe_cpu<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&CpuSample) + Send + Sync + 'static,
    {
        self.cpu.subscribe(callback)
    }

    pub fn subscribe_memory<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&MemorySample) + Send + Sync + 'static,
    {
        self.memory.subscribe(callback)
    }

    pub fn subscribe_disk<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DiskSample) + Send + Sync + 'static,
    {
        self.disk.subscribe(callback)
    }

    pub fn subscribe_network<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&NetworkSample) + Send + Sync + 'static,
    {
        self.network.subscribe(callback)
    }

    pub fn unsubscribe_cpu(&self, id: SubscriptionId) -> bool {
        self.cpu.unsubscribe(id)
    }

    pub fn unsubscribe_memory(&self, id: SubscriptionId) -> bool {
        self.memory.unsubscribe(id)
    }

    pub fn unsubscribe_disk(&self, id: SubscriptionId) -> bool {
        self.disk.unsubscribe(id)
    }

    pub fn unsubscribe_network(&self, id: SubscriptionId) -> bool {
        self.network.unsubscribe(id)
    }

    pub fn subscriber_count_cpu(&self) -> usize {
        self.cpu.len()
    }

    pub fn subscriber_count_memory(&self) -> usize {
        self.memory.len()
    }

    pub fn subscriber_count_disk(&self) -> usize {
        self.disk.len()
    }

    pub fn subscriber_count_network(&self) -> usize {
        self.network.len()
    }
}
