//! Contributions advanced explicitly by an external driver.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::cadence::Cadence;
use crate::error::{VarError, VarResult};
use crate::modifier::Modifier;

/// A contribution evaluated as `curve(progress)`, where progress is advanced
/// explicitly rather than by elapsed time.
///
/// The same evaluation shape as a decaying modifier, but the owner decides
/// when and how fast progress moves: a campfire burns only while lit, a meal
/// is digested only while the creature is awake. Obtain a
/// [`ProgressDriver`] with [`driver`](Self::driver) before boxing the
/// modifier into its owner; the driver is the only external way to move
/// progress, and progress only moves forward.
pub struct ProgressModifier {
    duration: f64,
    curve: Box<dyn Fn(f64) -> f64>,
    progress: Rc<Cell<f64>>,
    description: Option<String>,
}

impl fmt::Debug for ProgressModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressModifier")
            .field("progress", &self.progress.get())
            .field("duration", &self.duration)
            .field("description", &self.description)
            .finish()
    }
}

impl ProgressModifier {
    /// A contribution following `curve` over `duration` units of progress.
    pub fn new(duration: f64, curve: impl Fn(f64) -> f64 + 'static) -> VarResult<Self> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(VarError::NonPositiveDuration { duration });
        }
        Ok(Self {
            duration,
            curve: Box::new(curve),
            progress: Rc::new(Cell::new(0.0)),
            description: None,
        })
    }

    /// A linearly draining quantity: `quantity · (1 − progress/duration)`.
    ///
    /// This is the fuel shape — the remaining contribution falls at a
    /// constant burn rate of `quantity / duration` per unit of progress.
    pub fn linear(quantity: f64, duration: f64) -> VarResult<Self> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(VarError::NonPositiveQuantity { quantity });
        }
        Self::new(duration, move |p| quantity * (1.0 - p / duration))
    }

    /// Attach an inspector description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// A handle that advances this modifier's progress from outside its
    /// owner.
    pub fn driver(&self) -> ProgressDriver {
        ProgressDriver {
            progress: Rc::clone(&self.progress),
        }
    }

    /// Progress accumulated so far.
    pub fn progress(&self) -> f64 {
        self.progress.get()
    }

    /// Total progress over which the curve is valid.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Progress still to cover before the modifier is spent.
    pub fn remaining(&self) -> f64 {
        (self.duration - self.progress.get()).max(0.0)
    }

    /// Advance progress by a non-negative amount, clamped internally.
    /// Infallible path for owners that compute their own deltas.
    pub(crate) fn consume(&self, delta: f64) {
        self.progress.set(self.progress.get() + delta.max(0.0));
    }
}

impl Modifier for ProgressModifier {
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn value(&self) -> f64 {
        let progress = self.progress.get();
        if progress <= self.duration {
            (self.curve)(progress)
        } else {
            0.0
        }
    }

    fn can_be_removed(&self) -> bool {
        self.progress.get() >= self.duration
    }

    fn cadence(&self) -> Cadence {
        Cadence::EachTick
    }
}

/// External handle advancing a [`ProgressModifier`]'s progress.
///
/// Cloneable and non-owning: the modifier itself stays exclusively owned by
/// its variable. Progress is monotone — moving it backward is an error, not
/// a correction mechanism.
#[derive(Debug, Clone)]
pub struct ProgressDriver {
    progress: Rc<Cell<f64>>,
}

impl ProgressDriver {
    /// Advance progress by `delta` units. Returns the new progress.
    ///
    /// A negative (or NaN) delta is rejected: progress never moves backward.
    pub fn advance(&self, delta: f64) -> VarResult<f64> {
        if delta.is_nan() || delta < 0.0 {
            return Err(VarError::ProgressMovedBackward { delta });
        }
        let next = self.progress.get() + delta;
        self.progress.set(next);
        Ok(next)
    }

    /// Progress accumulated so far.
    pub fn progress(&self) -> f64 {
        self.progress.get()
    }
}
