//! Watch sessions
//!
//! This module implements the client-facing aggregation layer:
//! - [`WatchSession`] - long-lived handle owning the backend and channel
//! - [`WatchRequest`] / [`WatchOutcome`] - per-call parameters and result
//! - the debounce aggregator loop that turns the raw event stream into one
//!   coalesced batch per `watch` call
//!
//! ## Architecture
//!
//! Construction starts the backend immediately; each `watch` call runs one
//! aggregation session against the live channel and blocks its caller until
//! a batch settles, a deadline fires, or a cancellation source trips.
//! `close` stops the backend and makes the handle terminal.
//!
//! ## Usage
//!
//! ```ignore
//! let session = WatchSession::start(SessionOptions::new(vec![path]))?;
//! let request = WatchRequest::new().with_debounce(Duration::from_millis(200));
//! match session.watch(&request)? {
//!     WatchOutcome::Batch(changes) => { /* ... */ }
//!     WatchOutcome::Signal | WatchOutcome::Stop | WatchOutcome::Timeout => { /* ... */ }
//! }
//! session.close();
//! ```

mod aggregate;
mod handle;


pub use aggregate::{WatchOutcome, WatchRequest, DEFAULT_DEBOUNCE, DEFAULT_STEP};
pub use handle::{SessionOptions, WatchSession, DEFAULT_POLL_DELAY};
