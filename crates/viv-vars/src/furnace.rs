//! Bounded attributes fed by priority-ordered fuel.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use viv_clock::{SimClock, SimTime};
use viv_collections::Heap;

use crate::error::{VarError, VarResult};
use crate::modifier::{Modifier, ProgressModifier};

/// A bounded attribute whose modifiers are fuel, consumed one at a time in
/// priority order as virtual time advances.
///
/// Where a plain [`Variable`](crate::Variable) lets every timed modifier
/// decay independently, a furnace drains its fuels sequentially: elapsed
/// time is charged against the front of a priority queue, and only once a
/// fuel is exhausted does the remainder carry into the next. Several meals
/// of different quality are eaten one at a time instead of all losing
/// freshness at once. Unconsumed fuel never increases as time advances.
///
/// By default the queue is keyed by the negative burn rate, so the
/// fastest-burning fuel is consumed first; callers can override the weight
/// per fuel.
pub struct FurnaceVariable {
    clock: Rc<SimClock>,
    base: f64,
    min: f64,
    max: f64,
    unit: Option<String>,
    state: RefCell<FurnaceState>,
}

struct FurnaceState {
    fuels: Heap<ProgressModifier>,
    consumed_until: SimTime,
}

impl FurnaceState {
    /// Charge elapsed virtual time against the fuel queue, front first.
    fn resolve_consumption(&mut self, now: SimTime) {
        let mut elapsed = now.since(self.consumed_until);
        self.consumed_until = now;
        while elapsed > 0.0 {
            let remaining = match self.fuels.peek() {
                Some(front) => front.remaining(),
                None => break,
            };
            if elapsed >= remaining {
                // Fuel exhausted: drop it and carry the rest forward.
                self.fuels.pop();
                elapsed -= remaining;
            } else {
                if let Some(front) = self.fuels.peek() {
                    front.consume(elapsed);
                }
                break;
            }
        }
    }
}

impl fmt::Debug for FurnaceVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("FurnaceVariable")
            .field("base", &self.base)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("unit", &self.unit)
            .field("fuels", &state.fuels.len())
            .field("consumed_until", &state.consumed_until)
            .finish()
    }
}

impl FurnaceVariable {
    /// Create a furnace variable. Fails unless `min < max`.
    pub fn new(clock: Rc<SimClock>, base: f64, min: f64, max: f64) -> VarResult<Self> {
        Self::build(clock, base, min, max, None)
    }

    /// Create a furnace variable with a display unit suffix.
    pub fn with_unit(
        clock: Rc<SimClock>,
        base: f64,
        min: f64,
        max: f64,
        unit: impl Into<String>,
    ) -> VarResult<Self> {
        Self::build(clock, base, min, max, Some(unit.into()))
    }

    fn build(
        clock: Rc<SimClock>,
        base: f64,
        min: f64,
        max: f64,
        unit: Option<String>,
    ) -> VarResult<Self> {
        if min.is_nan() || max.is_nan() || min >= max {
            return Err(VarError::InvalidBounds { min, max });
        }
        let consumed_until = clock.now();
        Ok(Self {
            clock,
            base,
            min,
            max,
            unit,
            state: RefCell::new(FurnaceState {
                fuels: Heap::new(),
                consumed_until,
            }),
        })
    }

    /// The unmodified base value.
    pub fn base(&self) -> f64 {
        self.base
    }

    /// The lower bound.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// The upper bound.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// The display unit suffix, if any.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Queue a fuel contributing `quantity` over `duration` virtual units,
    /// consumed at the default priority: fastest-burning first.
    pub fn add_fuel(&self, quantity: f64, duration: f64) -> VarResult<()> {
        let weight = -(quantity / duration);
        self.add_fuel_weighted(quantity, duration, weight)
    }

    /// Queue a fuel with an explicit consumption-priority weight; lower
    /// weights are consumed first.
    pub fn add_fuel_weighted(&self, quantity: f64, duration: f64, weight: f64) -> VarResult<()> {
        let fuel = ProgressModifier::linear(quantity, duration)?;
        self.state.borrow_mut().fuels.push(fuel, weight);
        Ok(())
    }

    /// The current value: `clamp(base + Σ remaining fuels, min, max)`.
    ///
    /// Consumption since the last query is resolved first, so querying is
    /// what moves fuel from "queued" to "burned".
    pub fn value(&self) -> f64 {
        let mut state = self.state.borrow_mut();
        state.resolve_consumption(self.clock.now());
        let sum: f64 = state.fuels.iter().map(Modifier::value).sum();
        (self.base + sum).clamp(self.min, self.max)
    }

    /// Total unconsumed fuel contribution. Non-negative, and never
    /// increasing as virtual time advances.
    pub fn remaining_fuel(&self) -> f64 {
        let mut state = self.state.borrow_mut();
        state.resolve_consumption(self.clock.now());
        state.fuels.iter().map(Modifier::value).sum()
    }

    /// Number of fuels not yet fully consumed.
    pub fn fuel_count(&self) -> usize {
        let mut state = self.state.borrow_mut();
        state.resolve_consumption(self.clock.now());
        state.fuels.len()
    }

    /// Whether any fuel remains.
    pub fn is_burning(&self) -> bool {
        self.fuel_count() > 0
    }

    /// The value normalized into `[0, 1]`, or `None` when either bound is
    /// infinite.
    pub fn fraction(&self) -> Option<f64> {
        if self.min.is_finite() && self.max.is_finite() {
            Some((self.value() - self.min) / (self.max - self.min))
        } else {
            None
        }
    }
}

impl fmt::Display for FurnaceVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(unit) => write!(f, "{:.1} {unit}", self.value()),
            None => write!(f, "{:.1}", self.value()),
        }
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
    fn bounds_are_checked_at_construction() {
        let clock = clock();
        assert!(matches!(
            FurnaceVariable::new(clock, 0.0, 5.0, 5.0),
            Err(VarError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn single_fuel_burns_linearly() {
        let clock = clock();
        let warmth = FurnaceVariable::new(Rc::clone(&clock), 0.0, 0.0, 100.0).unwrap();
        warmth.add_fuel(20.0, 10.0).unwrap();
        assert!((warmth.value() - 20.0).abs() < f64::EPSILON);

        clock.advance(5000.0, 1.0).unwrap();
        assert!((warmth.value() - 10.0).abs() < f64::EPSILON);

        clock.advance(10_000.0, 1.0).unwrap();
        assert_eq!(warmth.value(), 0.0);
        assert!(!warmth.is_burning());
    }

    #[test]
    fn invalid_fuel_is_rejected() {
        let clock = clock();
        let furnace = FurnaceVariable::new(clock, 0.0, 0.0, 100.0).unwrap();
        assert!(matches!(
            furnace.add_fuel(0.0, 10.0),
            Err(VarError::NonPositiveQuantity { .. })
        ));
        assert!(matches!(
            furnace.add_fuel(10.0, 0.0),
            Err(VarError::NonPositiveDuration { .. })
        ));
    }

    #[test]
    fn fastest_burning_fuel_is_consumed_first() {
        let clock = clock();
        let furnace = FurnaceVariable::new(Rc::clone(&clock), 0.0, 0.0, 100.0).unwrap();
        // Snack: 10 over 5 units (rate 2). Feast: 10 over 20 units (rate 0.5).
        furnace.add_fuel(10.0, 20.0).unwrap();
        furnace.add_fuel(10.0, 5.0).unwrap();
        assert!((furnace.remaining_fuel() - 20.0).abs() < f64::EPSILON);

        // 5 units in: the snack is gone, the feast untouched.
        clock.advance(5000.0, 1.0).unwrap();
        assert_eq!(furnace.fuel_count(), 1);
        assert!((furnace.remaining_fuel() - 10.0).abs() < f64::EPSILON);

        // 10 more units: half the feast burned.
        clock.advance(10_000.0, 1.0).unwrap();
        assert!((furnace.remaining_fuel() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn exhaustion_carries_the_remainder_forward() {
        let clock = clock();
        let furnace = FurnaceVariable::new(Rc::clone(&clock), 0.0, 0.0, 100.0).unwrap();
        furnace.add_fuel(6.0, 3.0).unwrap();
        furnace.add_fuel(8.0, 8.0).unwrap();

        // 5 units: 3 exhaust the first fuel, 2 carry into the second.
        clock.advance(5000.0, 1.0).unwrap();
        assert_eq!(furnace.fuel_count(), 1);
        assert!((furnace.remaining_fuel() - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn weight_override_reorders_consumption() {
        let clock = clock();
        let furnace = FurnaceVariable::new(Rc::clone(&clock), 0.0, 0.0, 100.0).unwrap();
        // The slow-burning fuel is forced to the front.
        furnace.add_fuel_weighted(10.0, 20.0, -100.0).unwrap();
        furnace.add_fuel(10.0, 5.0).unwrap();

        clock.advance(20_000.0, 1.0).unwrap();
        // The forced fuel burned for its full 20 units; the snack is intact.
        assert_eq!(furnace.fuel_count(), 1);
        assert!((furnace.remaining_fuel() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn remaining_fuel_is_monotonically_non_increasing() {
        let clock = clock();
        let furnace = FurnaceVariable::new(Rc::clone(&clock), 0.0, 0.0, 100.0).unwrap();
        furnace.add_fuel(5.0, 2.0).unwrap();
        furnace.add_fuel(7.0, 9.0).unwrap();

        let mut last = furnace.remaining_fuel();
        for _ in 0..16 {
            clock.advance(1000.0, 1.0).unwrap();
            let now = furnace.remaining_fuel();
            assert!(now <= last);
            assert!(now >= 0.0);
            last = now;
        }
        assert_eq!(last, 0.0);
    }

    #[test]
    fn value_returns_to_base_when_fuel_runs_out() {
        let clock = clock();
        let furnace = FurnaceVariable::new(Rc::clone(&clock), 15.0, 0.0, 100.0).unwrap();
        furnace.add_fuel(20.0, 10.0).unwrap();
        assert!((furnace.value() - 35.0).abs() < f64::EPSILON);

        clock.advance(30_000.0, 1.0).unwrap();
        assert!((furnace.value() - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn value_is_clamped() {
        let clock = clock();
        let furnace = FurnaceVariable::new(clock, 0.0, 0.0, 25.0).unwrap();
        furnace.add_fuel(100.0, 10.0).unwrap();
        assert_eq!(furnace.value(), 25.0);
        assert!((furnace.fraction().unwrap() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn display_renders_value_with_unit() {
        let clock = clock();
        let furnace = FurnaceVariable::with_unit(clock, 0.0, 0.0, 100.0, "°C").unwrap();
        furnace.add_fuel(20.0, 10.0).unwrap();
        assert_eq!(furnace.to_string(), "20.0 °C");
    }
}
