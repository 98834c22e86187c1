//! Interrupt handling.
//!
//! The teleop loop polls a [`Shutdown`] token between key presses. Ctrl-C sets
//! the token, restores the terminal and ends the process straight away, since
//! the loop is usually parked in a blocking read when it arrives.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::{debug, info};

use crate::error::Result;
use crate::terminal::RestoreHandle;

#[derive(Default)]
struct Inner {
    requested: AtomicBool,
    restore: OnceLock<RestoreHandle>,
}

/// Shared by every clone, so a handler installed before the terminal is
/// acquired still sees the restore handle attached afterwards.
#[derive(Clone, Default)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore this terminal when the token is triggered
    pub fn with_restore(self, handle: RestoreHandle) -> Self {
        self.attach_restore(handle);
        self
    }

    /// Attach the terminal to restore. Only the first handle is kept.
    pub fn attach_restore(&self, handle: RestoreHandle) {
        if self.inner.restore.set(handle).is_err() {
            debug!("Restore handle already attached");
        }
    }

    pub fn is_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// Flag the loop to stop and put the terminal back. No allocation, no I/O
    /// beyond the single restore call.
    pub fn trigger(&self) {
        self.inner.requested.store(true, Ordering::SeqCst);
        if let Some(handle) = self.inner.restore.get() {
            handle.restore();
        }
    }

    /// Route Ctrl-C to `trigger`, then exit with status 0
    pub fn install_ctrl_c(&self) -> Result<()> {
        let token = self.clone();
        ctrlc::set_handler(move || {
            token.trigger();
            std::process::exit(0);
        })?;
        info!("Ctrl-C handler installed");
        Ok(())
    }
}
