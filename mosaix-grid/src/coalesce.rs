//! Resize/scroll signal coalescing.
//!
//! Raw viewport signals arrive at input rate; relayout runs at frame rate.
//! The coalescer keeps at most one frame callback in flight and folds every
//! signal that arrives in between into it.

use crate::env::{CallbackHandle, Scheduler};

/// Folds raw scroll/resize signals into one relayout trigger per frame.
#[derive(Debug, Default)]
pub struct RelayoutCoalescer {
    enabled: bool,
    pending: Option<CallbackHandle>,
}

impl RelayoutCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record a raw signal. Schedules a frame callback unless one is already
    /// in flight.
    pub fn signal(&mut self, scheduler: &mut dyn Scheduler) {
        if !self.enabled || self.pending.is_some() {
            return;
        }
        self.pending = Some(scheduler.schedule_frame());
    }

    /// Returns true if `handle` is the in-flight frame callback, consuming
    /// it; the caller then runs exactly one layout+visibility pass.
    pub fn on_timer(&mut self, handle: CallbackHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Stop listening and cancel any pending emission. Re-enable with
    /// [`RelayoutCoalescer::enable`].
    pub fn teardown(&mut self, scheduler: &mut dyn Scheduler) {
        self.enabled = false;
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_timeout(handle);
        }
    }
}
