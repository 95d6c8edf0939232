//! Frame scheduling and time sources.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Milliseconds in one nominal 60 Hz frame.
pub const FRAME_TIME_MS: f64 = 1000.0 / 60.0;

/// Opaque ticket for one requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Schedules a callback on the next display refresh.
///
/// The effect does not own the callback: when the requested frame is due,
/// the host calls [`crate::SnowfallEffect::tick`].
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// A monotonically non-decreasing millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Scheduler whose host checks once per refresh whether a frame is pending.
#[derive(Debug, Default)]
pub struct PolledScheduler {
    next_id: u64,
    pending: Option<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

impl PolledScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a requested frame is waiting for the host to run it.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Total frames requested so far.
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Total frames cancelled before they fired.
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for PolledScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-advanced clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms.max(0.0));
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Nominal frames elapsed in `elapsed_ms`, never below one.
pub fn delta_factor(elapsed_ms: f64) -> f64 {
    (elapsed_ms / FRAME_TIME_MS).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_factor_clamps_below_one_frame() {
        assert_eq!(delta_factor(0.0), 1.0);
        assert_eq!(delta_factor(5.0), 1.0);
        assert_eq!(delta_factor(-20.0), 1.0);
    }

    #[test]
    fn test_delta_factor_fast_forwards() {
        assert!((delta_factor(FRAME_TIME_MS * 3.0) - 3.0).abs() < 1e-9);
        assert!((delta_factor(1000.0) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_polled_scheduler_cancel_only_matches_pending() {
        let mut scheduler = PolledScheduler::new();
        let first = scheduler.request_frame();
        let second = scheduler.request_frame();
        assert_ne!(first, second);

        scheduler.cancel_frame(first);
        assert!(scheduler.is_pending());
        assert_eq!(scheduler.cancelled(), 0);

        scheduler.cancel_frame(second);
        assert!(!scheduler.is_pending());
        assert_eq!(scheduler.cancelled(), 1);
        assert_eq!(scheduler.requested(), 2);
    }

    #[test]
    fn test_manual_clock_is_shared() {
        let clock = ManualClock::new(100.0);
        let view = clock.clone();
        clock.advance(16.0);
        assert_eq!(view.now_ms(), 116.0);
        view.set(5.0);
        assert_eq!(clock.now_ms(), 5.0);
    }

    #[test]
    fn test_system_clock_does_not_go_backwards() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
