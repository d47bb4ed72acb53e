//! Lifecycle handle for a running dispatcher thread.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::error;

/// Dispatcher lifecycle: `Starting` until the subscription is open,
/// `Consuming` while the loop runs, `Stopped` once it has exited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatcherState {
    Starting,
    Consuming,
    Stopped,
}

impl DispatcherState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => DispatcherState::Starting,
            1 => DispatcherState::Consuming,
            _ => DispatcherState::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            DispatcherState::Starting => 0,
            DispatcherState::Consuming => 1,
            DispatcherState::Stopped => 2,
        }
    }
}

/// State shared between the dispatcher thread and its handle.
#[derive(Clone, Default)]
pub(crate) struct SharedState(Arc<AtomicU8>);

impl SharedState {
    pub(crate) fn get(&self) -> DispatcherState {
        DispatcherState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, state: DispatcherState) {
        self.0.store(state.as_u8(), Ordering::Release);
    }

    /// A guard that marks the dispatcher `Stopped` when dropped, however the
    /// owning thread exits.
    pub(crate) fn stopped_on_exit(&self) -> StoppedOnExit {
        StoppedOnExit(self.clone())
    }
}

pub(crate) struct StoppedOnExit(SharedState);

impl Drop for StoppedOnExit {
    fn drop(&mut self) {
        self.0.set(DispatcherState::Stopped);
    }
}

/// Statistics from a dispatcher thread.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatcherStats {
    /// Messages routed to the handler that succeeded.
    pub handled: usize,
    /// Messages routed to the handler that failed.
    pub failed: usize,
    /// Messages with a known tag whose payload did not decode.
    pub malformed: usize,
    /// Messages with an unknown tag.
    pub unroutable: usize,
    /// Poll cycles completed.
    pub polls: usize,
}

/// Handle to a background dispatcher thread. Drop or call `stop()` to shut down.
pub struct DispatcherHandle {
    topic: String,
    state: SharedState,
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<DispatcherStats>>,
}

impl DispatcherHandle {
    pub(crate) fn new(
        topic: String,
        state: SharedState,
        stop_tx: Sender<()>,
        handle: JoinHandle<DispatcherStats>,
    ) -> Self {
        Self {
            topic,
            state,
            stop_tx,
            handle: Some(handle),
        }
    }

    /// The consumed topic.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn state(&self) -> DispatcherState {
        self.state.get()
    }

    /// Block until the dispatcher leaves `Starting`, or `timeout` passes.
    /// Returns whether it is consuming.
    pub fn wait_until_consuming(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.state() == DispatcherState::Starting && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        self.state() == DispatcherState::Consuming
    }

    /// Stop the dispatcher and wait for it to finish. Returns stats.
    pub fn stop(mut self) -> DispatcherStats {
        let _ = self.stop_tx.send(());
        let stats = match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                error!(topic = %self.topic, "dispatcher thread panicked; stats lost");
                DispatcherStats::default()
            }),
            None => DispatcherStats::default(),
        };
        self.state.set(DispatcherState::Stopped);
        stats
    }

    /// Signal stop without waiting.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(());
    }
}

impl Drop for DispatcherHandle {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}
