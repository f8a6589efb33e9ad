//! Resize-to-redraw coordination.
//!
//! Hosts report every size notification as it arrives; the coordinator
//! coalesces bursts (a terminal being dragged emits dozens) and applies only
//! the most recent size once things go quiet, so mid-animation frames never
//! fight a reallocating backing store.

use std::time::{Duration, Instant};

use super::surface::{Framebuffer, SurfaceSize};
use crate::sched::Throttle;

/// Quiet period before a reported size is applied.
pub const RESIZE_THROTTLE: Duration = Duration::from_millis(16);

/// Throttled size application for one framebuffer.
#[derive(Debug)]
pub struct ResizeCoordinator {
    throttle: Throttle,
    pending: Option<SurfaceSize>,
}

impl ResizeCoordinator {
    pub fn new() -> Self {
        Self::with_delay(RESIZE_THROTTLE)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            throttle: Throttle::new(delay),
            pending: None,
        }
    }

    /// Records a size notification. Later notifications within the quiet
    /// period replace earlier ones.
    pub fn notify(&mut self, size: SurfaceSize, now: Instant) {
        self.pending = Some(size);
        self.throttle.notify(now);
    }

    /// Applies the pending size once the burst has settled.
    ///
    /// Returns true when the framebuffer was actually reallocated, which is
    /// the only case where the caller must redraw; a settled notification
    /// matching the current size leaves the surface and its contents alone.
    pub fn poll(&mut self, fb: &mut Framebuffer, now: Instant) -> bool {
        if !self.throttle.fire(now) {
            return false;
        }
        match self.pending.take() {
            Some(size) => fb.resize_if_needed(size),
            None => false,
        }
    }

    pub fn pending(&self) -> bool {
        self.throttle.pending()
    }

    pub fn cancel(&mut self) {
        self.throttle.cancel();
        self.pending = None;
    }
}

impl Default for ResizeCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
