//! The virtual time source and its callback scheduler.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use viv_collections::Heap;

use crate::config::ClockConfig;
use crate::error::{ClockError, ClockResult};
use crate::time::SimTime;
use crate::wait::{Sleep, SleepState};

type Callback = Box<dyn FnOnce()>;

/// A monotonically increasing virtual-time source with one-shot callback
/// scheduling.
///
/// The clock never reads wall time: an external tick driver feeds it real
/// millisecond deltas through [`advance`](Self::advance), which converts
/// them into virtual units and fires every callback that has come due. All
/// methods take `&self`, so a single clock can be shared as `Rc<SimClock>`
/// into every variable and modifier that needs a time source — there is no
/// process-wide global, and tests inject their own fully controlled clock.
///
/// Single-threaded and synchronous by contract: callbacks run inline during
/// `advance`, and a callback must never call `advance` itself.
pub struct SimClock {
    millis_per_unit: f64,
    now: Cell<f64>,
    ticks: Cell<u64>,
    queue: RefCell<Heap<Callback>>,
    advancing: Cell<bool>,
}

impl fmt::Debug for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimClock")
            .field("now", &self.now.get())
            .field("ticks", &self.ticks.get())
            .field("pending", &self.queue.borrow().len())
            .finish()
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(ClockConfig::default())
    }
}

impl SimClock {
    /// Create a clock at time zero with the given configuration.
    pub fn new(config: ClockConfig) -> Self {
        debug_assert!(config.millis_per_unit > 0.0);
        Self {
            millis_per_unit: config.millis_per_unit,
            now: Cell::new(0.0),
            ticks: Cell::new(0),
            queue: RefCell::new(Heap::new()),
            advancing: Cell::new(false),
        }
    }

    /// Current elapsed virtual time.
    pub fn now(&self) -> SimTime {
        SimTime::from_units(self.now.get())
    }

    /// The point `units` virtual units after [`now`](Self::now).
    pub fn after(&self, units: f64) -> SimTime {
        self.now().offset(units)
    }

    /// Number of `advance` calls so far. Diagnostic only.
    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }

    /// Number of callbacks waiting for a future fire time.
    pub fn pending_callbacks(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Schedule a one-shot callback for time `at`.
    ///
    /// A callback whose fire time is already due (`at <= now()`) is invoked
    /// synchronously before this method returns. Scheduling at
    /// [`SimTime::NEVER`] is rejected. There is no cancellation: a callback
    /// that may become irrelevant should check liveness in its own body.
    pub fn schedule(&self, at: SimTime, callback: impl FnOnce() + 'static) -> ClockResult<()> {
        if at.is_never() {
            return Err(ClockError::ScheduledNever);
        }
        if at.units() <= self.now.get() {
            callback();
            return Ok(());
        }
        self.queue.borrow_mut().push(Box::new(callback), at.units());
        Ok(())
    }

    /// Return a [`Sleep`] future that resolves once `units` virtual units
    /// have elapsed. Waiting for a non-finite duration fails immediately
    /// rather than hanging forever.
    pub fn wait_for(&self, units: f64) -> ClockResult<Sleep> {
        self.wait_until(self.after(units))
    }

    /// Return a [`Sleep`] future that resolves once the clock reaches `at`.
    /// Waiting for [`SimTime::NEVER`] fails immediately rather than hanging
    /// forever.
    pub fn wait_until(&self, at: SimTime) -> ClockResult<Sleep> {
        if at.is_never() {
            return Err(ClockError::WaitForNever);
        }
        let state = Rc::new(RefCell::new(SleepState::default()));
        let wake = Rc::clone(&state);
        self.schedule(at, move || {
            let mut state = wake.borrow_mut();
            state.elapsed = true;
            if let Some(waker) = state.waker.take() {
                waker.wake();
            }
        })?;
        Ok(Sleep::new(state))
    }

    /// Advance virtual time by a real-time delta and fire every callback
    /// that has come due, in ascending fire-time order.
    ///
    /// `real_delta_ms / millis_per_unit * fast_forward` virtual units are
    /// added to the current time. Callbacks scheduled during the drain for a
    /// time at or before the new now also fire before this call returns;
    /// callbacks for a later time wait for a future `advance`. Calling
    /// `advance` from inside a firing callback is an error.
    pub fn advance(&self, real_delta_ms: f64, fast_forward: f64) -> ClockResult<SimTime> {
        if !real_delta_ms.is_finite()
            || real_delta_ms < 0.0
            || !fast_forward.is_finite()
            || fast_forward <= 0.0
        {
            return Err(ClockError::InvalidAdvance {
                delta: real_delta_ms,
                fast_forward,
            });
        }
        if self.advancing.replace(true) {
            return Err(ClockError::ReentrantAdvance);
        }

        let now = self.now.get() + real_delta_ms / self.millis_per_unit * fast_forward;
        self.now.set(now);
        self.ticks.set(self.ticks.get() + 1);

        while let Some(callback) = self.pop_due(now) {
            callback();
        }

        self.advancing.set(false);
        Ok(SimTime::from_units(now))
    }

    /// Pop the front callback if its fire time is due. The queue borrow is
    /// released before the callback runs, since callbacks may schedule.
    fn pop_due(&self, now: f64) -> Option<Callback> {
        let mut queue = self.queue.borrow_mut();
        match queue.peek_weight() {
            Some(at) if at <= now => queue.pop(),
            _ => None,
        }
    }
}
