//! Ctrl+C handling for an orderly stop between combinations.
//!
//! The sweep never aborts mid-iteration: the tunnel of the current combination
//! is always torn down first, then the runner checks the flag and stops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

/// Polled by the runner between combinations.
pub trait ShutdownCheck: Send + Sync {
    fn should_stop(&self) -> bool;
}

/// Shared flag set by the SIGINT handler.
#[derive(Debug, Clone)]
pub struct ShutdownFlag {
    flag: Arc<AtomicBool>,
}

impl ShutdownFlag {
    /// Create a flag and register it as the process Ctrl+C handler.
    ///
    /// If a handler is already registered the flag still works, it just can
    /// only be triggered programmatically.
    pub fn install() -> Self {
        let flag = Self::manual();
        let handler_flag = flag.flag.clone();

        if let Err(error) = ctrlc::set_handler(move || {
            if !handler_flag.swap(true, Ordering::SeqCst) {
                info!("interrupt received, stopping after the current combination");
            }
        }) {
            warn!(%error, "could not install Ctrl+C handler");
        }

        flag
    }

    /// A flag without a signal handler.
    pub fn manual() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl ShutdownCheck for ShutdownFlag {
    fn should_stop(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Never requests a stop; the default for library callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverShutdown;

impl ShutdownCheck for NeverShutdown {
    fn should_stop(&self) -> bool {
        false
    }
}
