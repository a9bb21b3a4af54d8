//! Suspended computations resolved by scheduled wake-ups.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// A future that resolves once the clock reaches its wake-up time.
///
/// Returned by [`SimClock::wait_for`](crate::SimClock::wait_for) and
/// [`SimClock::wait_until`](crate::SimClock::wait_until). The wake-up is a
/// one-shot callback scheduled on the clock, so the future resolves during
/// the `advance` call that crosses the target time. A wait for a time that
/// is already due resolves on its first poll. Single-threaded by design:
/// the future is not `Send` and needs no runtime — any executor (or manual
/// polling) works.
#[derive(Debug)]
pub struct Sleep {
    state: Rc<RefCell<SleepState>>,
}

#[derive(Debug, Default)]
pub(crate) struct SleepState {
    pub(crate) elapsed: bool,
    pub(crate) waker: Option<Waker>,
}

impl Sleep {
    pub(crate) fn new(state: Rc<RefCell<SleepState>>) -> Self {
        Self { state }
    }

    /// Whether the wake-up time has been reached.
    pub fn is_elapsed(&self) -> bool {
        self.state.borrow().elapsed
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut state = self.state.borrow_mut();
        if state.elapsed {
            Poll::Ready(())
        } else {
            state.waker = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}
