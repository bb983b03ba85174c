//! Cooperative cancellation for long-running construction and traversal
//!
//! An [`Interrupt`] is a cheap, cloneable handle around a shared flag. The
//! builder checks it between phases and the walker between nodes; once it is
//! observed the operation stops with [`Error::Interrupted`](crate::Error).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Shared cancellation signal
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    /// Create a signal that has not been triggered
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested
    #[inline]
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Trigger this signal after `timeout` from a background thread
    ///
    /// The thread exits early if the signal is triggered by someone else.
    pub fn trigger_after(&self, timeout: Duration) -> JoinHandle<()> {
        let interrupt = self.clone();
        thread::spawn(move || {
            let step = Duration::from_millis(10).min(timeout);
            let mut waited = Duration::ZERO;
            while waited < timeout {
                if interrupt.is_triggered() {
                    return;
                }
                thread::sleep(step);
                waited += step;
            }
            interrupt.trigger();
        })
    }
}
