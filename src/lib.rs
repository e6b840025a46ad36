//! Settle - debounced filesystem change batching
//!
//! Settle lets a caller block while watching one or more filesystem paths
//! and receive a single coalesced batch of change events once activity
//! settles, instead of a noisy per-event stream. A [`WatchSession`] owns a
//! background watch backend (native OS notifications, or polling when
//! forced); each [`WatchSession::watch`] call aggregates raw events into a
//! deduplicated batch governed by a debounce window, a step interval, an
//! optional absolute timeout, and two cooperative cancellation sources.

pub mod cancel;
pub mod error;
pub mod event;
pub mod session;

mod backend;

// Re-exports for convenience
pub use cancel::{SignalFlag, StopToken};
pub use error::{SettleError, SettleResult};
pub use event::{Batch, ChangeEvent, ChangeKind};
pub use session::{
    SessionOptions, WatchOutcome, WatchRequest, WatchSession, DEFAULT_DEBOUNCE, DEFAULT_POLL_DELAY,
    DEFAULT_STEP,
};
