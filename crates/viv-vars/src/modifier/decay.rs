//! Contributions that follow a curve over elapsed time.

use std::fmt;
use std::rc::Rc;

use viv_clock::{SimClock, SimTime};

use crate::cadence::Cadence;
use crate::error::{VarError, VarResult};
use crate::modifier::Modifier;

/// A contribution evaluated as `curve(elapsed)` over a finite lifetime.
///
/// The curve is valid over `[0, duration]` virtual units since creation;
/// outside that window the contribution is zero and the modifier is
/// removable. The [`exponential`](Self::exponential) factory builds the
/// common half-life decay and derives its lifetime from an insignificance
/// threshold.
pub struct DecayingModifier {
    clock: Rc<SimClock>,
    created_at: SimTime,
    duration: f64,
    curve: Box<dyn Fn(f64) -> f64>,
    description: Option<String>,
}

impl fmt::Debug for DecayingModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecayingModifier")
            .field("created_at", &self.created_at)
            .field("duration", &self.duration)
            .field("description", &self.description)
            .finish()
    }
}

impl DecayingModifier {
    /// A contribution following `curve` over the next `duration` virtual
    /// units.
    pub fn new(
        clock: Rc<SimClock>,
        duration: f64,
        curve: impl Fn(f64) -> f64 + 'static,
    ) -> VarResult<Self> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(VarError::NonPositiveDuration { duration });
        }
        let created_at = clock.now();
        Ok(Self {
            clock,
            created_at,
            duration,
            curve: Box::new(curve),
            description: None,
        })
    }

    /// An exponential half-life decay: `initial · 2^(−t / half_life)`.
    ///
    /// Removable once its magnitude would drop below half of the initial
    /// value — i.e. after exactly one half-life. Use
    /// [`exponential_with_threshold`](Self::exponential_with_threshold) for
    /// a custom insignificance threshold.
    pub fn exponential(clock: Rc<SimClock>, initial: f64, half_life: f64) -> VarResult<Self> {
        Self::exponential_with_threshold(clock, initial, half_life, initial / 2.0)
    }

    /// An exponential half-life decay removable once its magnitude would
    /// drop below `threshold`.
    ///
    /// The threshold must sit between zero and the initial value: a decay
    /// sliding toward zero can never cross a threshold on the other side of
    /// zero, and a zero threshold would never be reached at all.
    pub fn exponential_with_threshold(
        clock: Rc<SimClock>,
        initial: f64,
        half_life: f64,
        threshold: f64,
    ) -> VarResult<Self> {
        if !half_life.is_finite() || half_life <= 0.0 {
            return Err(VarError::NonPositiveHalfLife { half_life });
        }
        if initial == 0.0 {
            return Err(VarError::ZeroInitialValue);
        }
        if threshold * initial <= 0.0 {
            return Err(VarError::ThresholdSignMismatch { initial, threshold });
        }
        let duration = half_life * (initial / threshold).abs().log2();
        Self::new(clock, duration, move |t| initial * (-t / half_life).exp2())
    }

    /// Attach an inspector description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Virtual units elapsed since creation.
    fn elapsed(&self) -> f64 {
        self.clock.now().since(self.created_at)
    }
}

impl Modifier for DecayingModifier {
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn value(&self) -> f64 {
        let elapsed = self.elapsed();
        if (0.0..=self.duration).contains(&elapsed) {
            (self.curve)(elapsed)
        } else {
            0.0
        }
    }

    fn can_be_removed(&self) -> bool {
        self.elapsed() >= self.duration
    }

    fn cadence(&self) -> Cadence {
        Cadence::EachTick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viv_clock::ClockConfig;

    fn clock() -> Rc<SimClock> {
        Rc::new(SimClock::new(ClockConfig::default()))
    }

    #[test]
    fn curve_is_evaluated_over_elapsed_time() {
        let clock = clock();
        let modifier = DecayingModifier::new(Rc::clone(&clock), 10.0, |t| 100.0 - t).unwrap();
        assert!((modifier.value() - 100.0).abs() < f64::EPSILON);

        clock.advance(4000.0, 1.0).unwrap();
        assert!((modifier.value() - 96.0).abs() < f64::EPSILON);
        assert!(!modifier.can_be_removed());
    }

    #[test]
    fn zero_outside_the_window_and_removable() {
        let clock = clock();
        let modifier = DecayingModifier::new(Rc::clone(&clock), 5.0, |_| 42.0).unwrap();
        clock.advance(6000.0, 1.0).unwrap();
        assert_eq!(modifier.value(), 0.0);
        assert!(modifier.can_be_removed());
    }

    #[test]
    fn exponential_halves_per_half_life() {
        let clock = clock();
        let modifier = DecayingModifier::exponential(Rc::clone(&clock), 100.0, 10.0).unwrap();
        assert!((modifier.value() - 100.0).abs() < 1e-9);

        clock.advance(10_000.0, 1.0).unwrap();
        assert!((modifier.value() - 50.0).abs() < 1e-9);
        // Down to the default insignificance threshold: one half-life.
        assert!(modifier.can_be_removed());
    }

    #[test]
    fn custom_threshold_stretches_the_lifetime() {
        let clock = clock();
        let modifier =
            DecayingModifier::exponential_with_threshold(Rc::clone(&clock), 100.0, 10.0, 25.0)
                .unwrap();
        clock.advance(10_000.0, 1.0).unwrap();
        assert!(!modifier.can_be_removed());
        clock.advance(10_000.0, 1.0).unwrap();
        // Two half-lives: magnitude reaches 25.
        assert!(modifier.can_be_removed());
    }

    #[test]
    fn negative_initial_decays_toward_zero() {
        let clock = clock();
        let modifier =
            DecayingModifier::exponential_with_threshold(Rc::clone(&clock), -80.0, 5.0, -10.0)
                .unwrap();
        assert!((modifier.value() + 80.0).abs() < 1e-9);
        clock.advance(5000.0, 1.0).unwrap();
        assert!((modifier.value() + 40.0).abs() < 1e-9);
        clock.advance(10_000.0, 1.0).unwrap();
        assert!(modifier.can_be_removed());
    }

    #[test]
    fn construction_invariants_are_checked() {
        let clock = clock();
        assert!(matches!(
            DecayingModifier::exponential(Rc::clone(&clock), 100.0, 0.0),
            Err(VarError::NonPositiveHalfLife { .. })
        ));
        assert!(matches!(
            DecayingModifier::exponential(Rc::clone(&clock), 0.0, 10.0),
            Err(VarError::ZeroInitialValue)
        ));
        // Threshold on the wrong side of zero can never be crossed.
        assert!(matches!(
            DecayingModifier::exponential_with_threshold(Rc::clone(&clock), 100.0, 10.0, -5.0),
            Err(VarError::ThresholdSignMismatch { .. })
        ));
        assert!(matches!(
            DecayingModifier::exponential_with_threshold(Rc::clone(&clock), 100.0, 10.0, 0.0),
            Err(VarError::ThresholdSignMismatch { .. })
        ));
        assert!(matches!(
            DecayingModifier::new(clock, -1.0, |_| 0.0),
            Err(VarError::NonPositiveDuration { .. })
        ));
    }

    #[test]
    fn cadence_is_each_tick() {
        let clock = clock();
        let modifier = DecayingModifier::exponential(clock, 10.0, 1.0).unwrap();
        assert_eq!(modifier.cadence(), Cadence::EachTick);
    }
}
