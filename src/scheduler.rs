use std::cell::{Cell, RefCell};

pub type FrameCallback = Box<dyn FnOnce(f64)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequestId(pub u64);

/// Host hook that runs a callback before the next repaint.
///
/// Timestamps are milliseconds on the same clock as [`FrameScheduler::now`].
/// `request_frame` returns `None` when the host refuses the request; the
/// callback is dropped without running.
pub trait FrameScheduler {
    fn now(&self) -> f64;
    fn request_frame(&self, callback: FrameCallback) -> Option<FrameRequestId>;
    fn cancel_frame(&self, id: FrameRequestId);
}

/// Single-threaded frame loop driven by explicit ticks, with a simulated
/// clock. Used by the CLI to render frame sequences and by tests.
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<f64>,
    next_id: Cell<u64>,
    pending: RefCell<Vec<(FrameRequestId, FrameCallback)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(now_ms: f64) -> Self {
        let scheduler = Self::default();
        scheduler.now.set(now_ms);
        scheduler
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Advances the clock by `delta_ms` and fires every callback that was
    /// requested before the tick. Callbacks requested while firing wait for
    /// the next tick. Returns the number of callbacks fired.
    pub fn tick(&self, delta_ms: f64) -> usize {
        self.now.set(self.now.get() + delta_ms);
        let due = std::mem::take(&mut *self.pending.borrow_mut());
        let timestamp = self.now.get();
        let fired = due.len();
        for (_, callback) in due {
            callback(timestamp);
        }
        fired
    }

    /// Ticks at `interval_ms` until `duration_ms` has passed. Returns the
    /// number of ticks.
    pub fn run_for(&self, duration_ms: f64, interval_ms: f64) -> usize {
        if interval_ms <= 0.0 {
            return 0;
        }
        let ticks = (duration_ms / interval_ms).floor() as usize;
        for _ in 0..ticks {
            self.tick(interval_ms);
        }
        ticks
    }
}

impl FrameScheduler for ManualScheduler {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn request_frame(&self, callback: FrameCallback) -> Option<FrameRequestId> {
        let id = FrameRequestId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.pending.borrow_mut().push((id, callback));
        Some(id)
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        self.pending.borrow_mut().retain(|(pending, _)| *pending != id);
    }
}
