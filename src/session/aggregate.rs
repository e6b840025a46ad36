//! The debounce aggregator loop
//!
//! A polling loop with three clocks (debounce window, step interval,
//! absolute timeout) and two cancellation sources. The loop drains the
//! event channel non-blockingly each iteration and sleeps for the step
//! interval in between; the sleep holds no lock the backend needs, so the
//! producer is never blocked by a waiting aggregator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use crate::cancel::StopToken;
use crate::error::{SettleError, SettleResult};
use crate::event::{Batch, RawEvent};

/// Default debounce window
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1600);

/// Default aggregator step interval
pub const DEFAULT_STEP: Duration = Duration::from_millis(50);

/// Per-call watch parameters
///
/// The three durations are independent: `debounce` bounds how long a burst
/// of changes is grouped (measured from the *first* change, so latency is
/// bounded even under continuous churn), `step` is the polling granularity
/// that bounds cancellation responsiveness, and `timeout` bounds the total
/// wait when nothing happens at all. No timeout means wait forever.
pub struct WatchRequest {
    /// Time after the first observed change during which further changes
    /// join the same batch
    pub debounce: Duration,
    /// Aggregator polling granularity
    pub step: Duration,
    /// Absolute cap on the wait while no change has been collected
    pub timeout: Option<Duration>,
    signal: Option<Box<dyn StopToken>>,
    stop: Option<Box<dyn StopToken>>,
}

impl Default for WatchRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchRequest {
    /// Create a request with default debounce/step, no timeout, and no
    /// cancellation sources
    pub fn new() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            step: DEFAULT_STEP,
            timeout: None,
            signal: None,
            stop: None,
        }
    }

    /// Set the debounce window
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the step interval
    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    /// Set the absolute timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attach the OS-signal cancellation source
    pub fn with_signal_source(mut self, signal: impl StopToken + 'static) -> Self {
        self.signal = Some(Box::new(signal));
        self
    }

    /// Attach the caller-supplied stop token
    pub fn with_stop_token(mut self, stop: impl StopToken + 'static) -> Self {
        self.stop = Some(Box::new(stop));
        self
    }

    fn signal_requested(&self) -> bool {
        self.signal.as_deref().map(|s| s.is_requested()).unwrap_or(false)
    }

    fn stop_requested(&self) -> bool {
        self.stop.as_deref().map(|s| s.is_requested()).unwrap_or(false)
    }
}

/// Result of a watch call
///
/// The sentinels are normal outcomes, not errors: a signal or stop discards
/// any partial batch, and a timeout can only fire while nothing has been
/// collected.
#[derive(Debug, PartialEq, Eq)]
pub enum WatchOutcome {
    /// Changes settled; the deduplicated batch
    Batch(Batch),
    /// The OS-signal source reported requested
    Signal,
    /// The stop token reported requested, or the session was closed
    Stop,
    /// The absolute timeout elapsed with nothing collected
    Timeout,
}

impl WatchOutcome {
    /// Whether this outcome carries a batch
    pub fn is_batch(&self) -> bool {
        matches!(self, WatchOutcome::Batch(_))
    }

    /// Extract the batch, if any
    pub fn into_batch(self) -> Option<Batch> {
        match self {
            WatchOutcome::Batch(batch) => Some(batch),
            _ => None,
        }
    }
}

/// Run one aggregation session against the channel.
///
/// `active` is the owning session's liveness flag; a concurrent `close`
/// clears it and the loop observes that within one step interval, returning
/// [`WatchOutcome::Stop`]. Cancellation checks run before the drain so a
/// pending signal always wins over a partial batch.
pub(crate) fn aggregate(
    rx: &Receiver<RawEvent>,
    request: &WatchRequest,
    active: &AtomicBool,
) -> SettleResult<WatchOutcome> {
    let started_at = Instant::now();
    let mut collected = Batch::new();
    let mut first_change_at: Option<Instant> = None;

    loop {
        if !active.load(Ordering::SeqCst) {
            return Ok(WatchOutcome::Stop);
        }
        if request.signal_requested() {
            return Ok(WatchOutcome::Signal);
        }
        if request.stop_requested() {
            return Ok(WatchOutcome::Stop);
        }
        if let Some(timeout) = request.timeout {
            if collected.is_empty() && started_at.elapsed() >= timeout {
                return Ok(WatchOutcome::Timeout);
            }
        }

        drain(rx, &mut collected, active)?;

        if !collected.is_empty() {
            let first = *first_change_at.get_or_insert_with(Instant::now);
            if first.elapsed() >= request.debounce {
                return Ok(WatchOutcome::Batch(collected));
            }
        }

        thread::sleep(request.step);
    }
}

/// Take everything available on the channel right now.
///
/// Duplicate `(kind, path)` pairs collapse into the set. An error entry
/// fails the call; a disconnected channel while the session is still active
/// means the producer died abnormally.
fn drain(rx: &Receiver<RawEvent>, collected: &mut Batch, active: &AtomicBool) -> SettleResult<()> {
    loop {
        match rx.try_recv() {
            Ok(RawEvent::Change(event)) => {
                collected.insert(event);
            }
            Ok(RawEvent::Error(message)) => {
                return Err(SettleError::Backend { message });
            }
            Err(TryRecvError::Empty) => return Ok(()),
            Err(TryRecvError::Disconnected) => {
                if active.load(Ordering::SeqCst) {
                    return Err(SettleError::backend("event channel disconnected"));
                }
                // close() ran; the next iteration returns Stop.
                return Ok(());
            }
        }
    }
}
