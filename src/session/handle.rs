//! Session handle lifecycle
//!
//! A [`WatchSession`] owns the backend and the consuming end of the event
//! channel. Construction starts the backend immediately; `close` tears it
//! down exactly once and makes the handle terminal.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Mutex, TryLockError};
use std::time::Duration;

use crate::backend::{self, FsBackend};
use crate::error::{SettleError, SettleResult};
use crate::event::RawEvent;

use super::aggregate::{aggregate, WatchOutcome, WatchRequest};

/// Default re-scan interval for the polling backend
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_millis(300);

/// Session construction options
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Paths to watch; each must exist at construction time
    pub paths: Vec<PathBuf>,
    /// Observe sub-directory changes (directories only)
    pub recursive: bool,
    /// Trace every raw event to the diagnostic sink; no behavioral effect
    pub debug: bool,
    /// Use the polling backend even where native notifications exist
    pub force_polling: bool,
    /// Re-scan interval, used only when polling
    pub poll_delay: Duration,
}

impl SessionOptions {
    /// Create options with the default strategy: recursive native
    /// notifications
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            recursive: true,
            debug: false,
            force_polling: false,
            poll_delay: DEFAULT_POLL_DELAY,
        }
    }

    /// Set whether sub-directories are observed
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Enable diagnostic tracing of raw events
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Force the polling backend
    pub fn with_force_polling(mut self, force_polling: bool) -> Self {
        self.force_polling = force_polling;
        self
    }

    /// Set the polling re-scan interval
    pub fn with_poll_delay(mut self, poll_delay: Duration) -> Self {
        self.poll_delay = poll_delay;
        self
    }
}

/// Long-lived handle owning the backend and the event channel.
///
/// At most one backend exists per handle. Once [`close`](Self::close) runs
/// the handle is terminal: further `watch` calls fail with
/// [`SettleError::Closed`]. Dropping the handle without an explicit close
/// performs the same teardown, but the explicit call is the documented,
/// prompt path.
pub struct WatchSession {
    rx: Mutex<Receiver<RawEvent>>,
    backend: Mutex<Option<FsBackend>>,
    active: AtomicBool,
}

impl WatchSession {
    /// Validate the paths and start the backend.
    ///
    /// The backend runs from here on, independent of any `watch` call; the
    /// channel absorbs events emitted before the first one.
    pub fn start(options: SessionOptions) -> SettleResult<Self> {
        let (backend, rx) = backend::start(&options)?;
        tracing::debug!(
            paths = ?options.paths,
            strategy = backend.strategy(),
            recursive = options.recursive,
            "watch session started"
        );

        Ok(Self {
            rx: Mutex::new(rx),
            backend: Mutex::new(Some(backend)),
            active: AtomicBool::new(true),
        })
    }

    /// Block until a batch of changes settles, a deadline fires, or a
    /// cancellation source trips.
    ///
    /// Only one `watch` may run per session at a time; a second concurrent
    /// call fails with [`SettleError::WatchInProgress`] instead of queueing.
    pub fn watch(&self, request: &WatchRequest) -> SettleResult<WatchOutcome> {
        if !self.active.load(Ordering::SeqCst) {
            return Err(SettleError::Closed);
        }

        let rx = match self.rx.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(SettleError::WatchInProgress),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        aggregate(&rx, request, &self.active)
    }

    /// Stop the backend and make the handle terminal.
    ///
    /// Safe to call multiple times; subsequent calls are no-ops. An
    /// in-flight `watch` observes the closure within one step interval and
    /// returns [`WatchOutcome::Stop`]. The `active` flag is cleared before
    /// the backend is dropped, so close never waits on the aggregator.
    pub fn close(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            let backend = match self.backend.lock() {
                Ok(mut guard) => guard.take(),
                Err(poisoned) => poisoned.into_inner().take(),
            };
            drop(backend);
            tracing::debug!("watch session closed");
        }
    }

    /// Whether the session can still serve `watch` calls
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        self.close();
    }
}
