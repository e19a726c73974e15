//! Background Tokio runtime that hosts every sampling timer.
//!
//! Schedulers never tick on the caller's thread. Unless a handle is injected,
//! they share one lazily built multi-threaded runtime for the whole process.

use once_cell::sync::OnceCell;
use tokio::runtime::{Builder, Handle, Runtime};

use crate::error::Result;

/// One worker per metric kind, so the four timers never wait on each other.
pub const DEFAULT_WORKER_THREADS: usize = 4;

static SHARED_RUNTIME: OnceCell<Runtime> = OnceCell::new();

/// Build a sampling runtime with the given number of worker threads.
pub fn build_runtime(worker_threads: usize) -> Result<Runtime> {
    let runtime = Builder::new_multi_thread()
        .worker_threads(worker_threads.max(1))
        .enable_time()
        .thread_name("metrics-worker")
        .build()?;

    Ok(runtime)
}

/// Handle to the process-wide sampling runtime, building it on first use.
pub fn shared_handle() -> Result<Handle> {
    let runtime = SHARED_RUNTIME.get_or_try_init(|| {
        log::debug!(
            "Starting shared sampling runtime with {} workers",
            DEFAULT_WORKER_THREADS
        );
        build_runtime(DEFAULT_WORKER_THREADS)
    })?;

    Ok(runtime.handle().clone())
}
