//! Trailing-edge debouncing and a one-at-a-time guard.

use std::{
    future::Future,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::task::AbortHandle;

use crate::util::lock::mutex_lock;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Runs only the last task scheduled within `window`.
///
/// Each `call` cancels the pending task and starts a fresh timer.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: Mutex<Option<AbortHandle>>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn call<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let window = self.window;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            task.await;
        });

        let mut pending = mutex_lock(&self.pending, "application::debounce", "call");
        if let Some(previous) = pending.replace(handle.abort_handle()) {
            previous.abort();
        }
    }

    /// Drop the pending task, if any.
    pub fn cancel(&self) {
        let mut pending = mutex_lock(&self.pending, "application::debounce", "cancel");
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Re-entry guard for actions that must not overlap, such as code generation.
#[derive(Debug, Default)]
pub struct InFlight {
    busy: AtomicBool,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another holder is still running.
    pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard { flag: &self.busy })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
