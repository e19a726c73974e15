//! Timer-driven poller for one metric kind.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use super::events::{panic_message, SubscriptionId, Subscribers};
use super::history::RingBuffer;
use super::metrics::Timestamped;
use super::runtime;
use crate::error::{MonitorError, Result};

/// Zero-argument collector: returns a fresh sample or fails for this tick.
pub type Producer<T> = Box<dyn FnMut() -> Result<T> + Send>;

struct SchedulerState<T> {
    current: Option<Arc<T>>,
    history: RingBuffer<Arc<T>>,
}

struct Shared<T> {
    producer: Mutex<Producer<T>>,
    state: Mutex<SchedulerState<T>>,
    subscribers: Subscribers<T>,
    /// Bumped on every start/stop; a timer task only ticks while it owns
    /// the current generation.
    generation: AtomicU64,
}

impl<T: Timestamped + Send + Sync + 'static> Shared<T> {
    fn tick(&self) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut producer = self.producer.lock();
            (*producer)()
        }));

        let mut sample = match outcome {
            Ok(Ok(sample)) => sample,
            Ok(Err(e)) => {
                log::debug!("Skipping tick: {}", e);
                return;
            }
            Err(payload) => {
                let err = MonitorError::collection(panic_message(payload.as_ref()));
                log::debug!("Skipping tick: {}", err);
                return;
            }
        };

        let sample = {
            let mut state = self.state.lock();

            let now = Utc::now();
            let stamp = match &state.current {
                Some(previous) if previous.timestamp() > now => previous.timestamp(),
                _ => now,
            };
            sample.set_timestamp(stamp);

            let sample = Arc::new(sample);
            state.current = Some(Arc::clone(&sample));
            state.history.push(Arc::clone(&sample));
            sample
        };

        self.subscribers.publish(&sample);
    }
}

/// Polls a producer at a fixed interval and keeps the latest sample plus a
/// bounded history.
///
/// Each scheduler runs as one sequential task on the sampling runtime, so two
/// ticks of the same scheduler never overlap; ticks that fall behind are
/// skipped rather than queued.
pub struct MetricScheduler<T> {
    shared: Arc<Shared<T>>,
    interval: Duration,
    runtime: Handle,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Timestamped + Send + Sync + 'static> MetricScheduler<T> {
    /// Create a scheduler on the shared sampling runtime.
    pub fn new<F>(producer: F, interval_ms: u64, history_size: usize) -> Result<Self>
    where
        F: FnMut() -> Result<T> + Send + 'static,
    {
        Self::with_handle(producer, interval_ms, history_size, runtime::shared_handle()?)
    }

    /// Create a scheduler whose timer runs on `runtime`.
    pub fn with_handle<F>(
        producer: F,
        interval_ms: u64,
        history_size: usize,
        runtime: Handle,
    ) -> Result<Self>
    where
        F: FnMut() -> Result<T> + Send + 'static,
    {
        validate_interval(interval_ms)?;
        let history = RingBuffer::new(history_size)?;

        Ok(Self {
            shared: Arc::new(Shared {
                producer: Mutex::new(Box::new(producer)),
                state: Mutex::new(SchedulerState {
                    current: None,
                    history,
                }),
                subscribers: Subscribers::new(),
                generation: AtomicU64::new(0),
            }),
            interval: Duration::from_millis(interval_ms),
            runtime,
            task: Mutex::new(None),
        })
    }

    /// Start ticking: once immediately, then every interval. No-op if running.
    pub fn start(&self) {
        let mut task = self.task.lock();
        if task.is_some() {
            return;
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let shared = Arc::clone(&self.shared);
        let period = self.interval;

        *task = Some(self.runtime.spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if shared.generation.load(Ordering::SeqCst) != generation {
                    break;
                }
                shared.tick();
            }
        }));
    }

    /// Stop ticking. No-op if already stopped.
    ///
    /// A tick that is already running may still complete after this returns.
    pub fn stop(&self) {
        if let Some(handle) = self.task.lock().take() {
            self.shared.generation.fetch_add(1, Ordering::SeqCst);
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().is_some()
    }

    pub fn current(&self) -> Option<Arc<T>> {
        self.shared.state.lock().current.clone()
    }

    /// History snapshot, oldest first
    pub fn history(&self) -> Vec<Arc<T>> {
        self.shared.state.lock().history.snapshot()
    }

    pub fn history_capacity(&self) -> usize {
        self.shared.state.lock().history.capacity()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Register a callback for every recorded sample.
    ///
    /// Callbacks run on the timer thread after the sample is stored.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.shared.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.subscribers.unsubscribe(id)
    }
}

impl<T> Drop for MetricScheduler<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            self.shared.generation.fetch_add(1, Ordering::SeqCst);
            handle.abort();
        }
    }
}

fn validate_interval(interval_ms: u64) -> Result<()> {
    if interval_ms == 0 {
        return Err(MonitorError::invalid_configuration(
            "sampling interval must be greater than zero",
        ));
    }
    Ok(())
}
