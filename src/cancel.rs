//! Cooperative cancellation sources
//!
//! The aggregator never interrupts anything preemptively; it polls a
//! [`StopToken`] once per loop iteration. Any shared boolean works: the
//! canonical token is an `Arc<AtomicBool>` flipped from elsewhere, and
//! [`SignalFlag`] wires the same shape to Ctrl+C.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{SettleError, SettleResult};

/// A read-only "should stop now" query, polled once per aggregator iteration.
///
/// The core never mutates a token; flipping it is the owner's business.
pub trait StopToken: Send + Sync {
    /// Whether cancellation has been requested
    fn is_requested(&self) -> bool;
}

impl StopToken for AtomicBool {
    fn is_requested(&self) -> bool {
        self.load(Ordering::SeqCst)
    }
}

impl<T: StopToken + ?Sized> StopToken for Arc<T> {
    fn is_requested(&self) -> bool {
        (**self).is_requested()
    }
}

/// Process-signal cancellation source backed by a Ctrl+C handler.
///
/// Cloning shares the underlying flag; once the handler fires, every clone
/// reports requested.
#[derive(Debug, Clone)]
pub struct SignalFlag {
    requested: Arc<AtomicBool>,
}

impl SignalFlag {
    /// Install the process Ctrl+C handler and return the flag it sets.
    ///
    /// The handler can only be installed once per process; a second install
    /// fails with [`SettleError::SignalHandler`].
    pub fn install() -> SettleResult<Self> {
        let requested = Arc::new(AtomicBool::new(false));
        let handler_flag = requested.clone();

        ctrlc::set_handler(move || {
            handler_flag.store(true, Ordering::SeqCst);
        })
        .map_err(|e| SettleError::SignalHandler {
            message: e.to_string(),
        })?;

        Ok(Self { requested })
    }

    /// Whether the signal has fired
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

impl StopToken for SignalFlag {
    fn is_requested(&self) -> bool {
        SignalFlag::is_requested(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_bool_token() {
        let token = Arc::new(AtomicBool::new(false));
        assert!(!token.is_requested());

        token.store(true, Ordering::SeqCst);
        assert!(token.is_requested());
    }

    #[test]
    fn test_arc_forwarding() {
        let inner = Arc::new(AtomicBool::new(true));
        let boxed: Arc<dyn StopToken> = inner;
        assert!(boxed.is_requested());
    }
}
