#![forbid(unsafe_code)]

//! Coalesce bursts of events into one callback per animation frame.
//!
//! Scroll and visual-viewport events can fire many times between paints.
//! A [`FrameCoalescer`] is the boolean in-flight guard in front of
//! `requestAnimationFrame`: the first event of a frame asks the host to
//! schedule a callback, later events in the same frame are absorbed, and
//! the callback clears the guard when it runs.

/// Answer to "should the host schedule an animation frame?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum FrameRequest {
    /// No callback is pending; schedule one.
    Schedule,
    /// A callback is already pending for this frame.
    Pending,
}

impl FrameRequest {
    #[must_use]
    pub const fn should_schedule(self) -> bool {
        matches!(self, Self::Schedule)
    }
}

/// In-flight guard for one frame-throttled signal.
#[derive(Debug, Clone, Default)]
pub struct FrameCoalescer {
    pending: bool,
    absorbed: u32,
}

impl FrameCoalescer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event.
    pub fn request(&mut self) -> FrameRequest {
        if self.pending {
            self.absorbed = self.absorbed.saturating_add(1);
            return FrameRequest::Pending;
        }
        self.pending = true;
        FrameRequest::Schedule
    }

    /// Called from the frame callback. Returns `false` if nothing was pending
    /// (for example after [`cancel`](Self::cancel)), in which case the work
    /// should be skipped.
    pub fn fire(&mut self) -> bool {
        self.absorbed = 0;
        std::mem::take(&mut self.pending)
    }

    /// Drop any pending request.
    pub fn cancel(&mut self) {
        self.pending = false;
        self.absorbed = 0;
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Events absorbed into the pending frame so far.
    #[must_use]
    pub const fn absorbed(&self) -> u32 {
        self.absorbed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_schedules_rest_coalesce() {
        let mut c = FrameCoalescer::new();
        assert_eq!(c.request(), FrameRequest::Schedule);
        assert_eq!(c.request(), FrameRequest::Pending);
        assert_eq!(c.request(), FrameRequest::Pending);
        assert_eq!(c.absorbed(), 2);
        assert!(c.fire());
        assert!(!c.is_pending());
        assert_eq!(c.request(), FrameRequest::Schedule);
    }

    #[test]
    fn fire_without_request_is_a_no_op() {
        let mut c = FrameCoalescer::new();
        assert!(!c.fire());
    }

    #[test]
    fn cancel_discards_pending_frame() {
        let mut c = FrameCoalescer::new();
        let _ = c.request();
        c.cancel();
        assert!(!c.fire());
        assert!(c.request().should_schedule());
    }
}
