//! Bounded, time-varying numeric attributes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use viv_clock::{SimClock, SimTime};
use viv_collections::MutableSequence;

use crate::cadence::{Cadence, CadenceCounts};
use crate::error::{VarError, VarResult};
use crate::modifier::Modifier;
use crate::summary::ModifierGroup;

/// Identifies a modifier attached to a specific variable.
///
/// Returned by [`Variable::add_modifier`]; ids are never reused within one
/// variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModifierId(u64);

/// A bounded numeric attribute: base value plus the sum of its active
/// modifiers, clamped to `[min, max]`.
///
/// The computed value is memoized under a policy derived from the active
/// modifiers' cadences: a variable carrying only permanent bonuses
/// recomputes only when its modifier set changes; one carrying a decaying
/// modifier recomputes once per distinct virtual time; one watched-derived
/// (monitoring) modifier forces recomputation on every query. Expired
/// modifiers are pruned during the same pass that sums the live ones.
///
/// Constructors return `Rc<Variable>`: monitoring modifiers hold shared,
/// non-owning references to their sources, and the attach-time cycle check
/// compares identities through the `Rc`.
pub struct Variable {
    clock: Rc<SimClock>,
    base: f64,
    min: f64,
    max: f64,
    unit: Option<String>,
    active: RefCell<ActiveSet>,
    memo: Cell<Option<Memo>>,
}

#[derive(Debug, Clone, Copy)]
struct Memo {
    value: f64,
    at: SimTime,
}

struct ActiveSet {
    entries: MutableSequence<Entry>,
    counts: CadenceCounts,
    next_id: u64,
}

struct Entry {
    id: ModifierId,
    modifier: Box<dyn Modifier>,
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("base", &self.base)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("unit", &self.unit)
            .field("modifiers", &self.active.borrow().entries.len())
            .field("memo", &self.memo.get())
            .finish()
    }
}

impl Variable {
    /// Create a bounded variable. Fails unless `min < max`.
    pub fn new(clock: Rc<SimClock>, base: f64, min: f64, max: f64) -> VarResult<Rc<Self>> {
        Self::build(clock, base, min, max, None)
    }

    /// Create a bounded variable with a display unit suffix.
    pub fn with_unit(
        clock: Rc<SimClock>,
        base: f64,
        min: f64,
        max: f64,
        unit: impl Into<String>,
    ) -> VarResult<Rc<Self>> {
        Self::build(clock, base, min, max, Some(unit.into()))
    }

    fn build(
        clock: Rc<SimClock>,
        base: f64,
        min: f64,
        max: f64,
        unit: Option<String>,
    ) -> VarResult<Rc<Self>> {
        if min.is_nan() || max.is_nan() || min >= max {
            return Err(VarError::InvalidBounds { min, max });
        }
        Ok(Rc::new(Self {
            clock,
            base,
            min,
            max,
            unit,
            active: RefCell::new(ActiveSet {
                entries: MutableSequence::new(),
                counts: CadenceCounts::default(),
                next_id: 0,
            }),
            memo: Cell::new(None),
        }))
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

    /// Number of active modifiers, counting any not yet pruned.
    pub fn modifier_count(&self) -> usize {
        self.active.borrow().entries.len()
    }

    /// The aggregated recompute cadence over the active modifiers.
    pub fn cadence(&self) -> Cadence {
        self.active.borrow().counts.aggregate()
    }

    /// Attach a modifier. Returns its id for later explicit removal.
    ///
    /// Fails if the modifier observes this variable, directly or through a
    /// chain of other monitors — a cycle would recurse on query. A modifier
    /// that is already removable is accepted and swept at the next
    /// recompute.
    pub fn add_modifier(self: &Rc<Self>, modifier: Box<dyn Modifier>) -> VarResult<ModifierId> {
        if modifier.depends_on(self) {
            return Err(VarError::DependencyCycle);
        }
        let mut active = self.active.borrow_mut();
        let id = ModifierId(active.next_id);
        active.next_id += 1;
        active.counts.add(modifier.cadence());
        active.entries.append(Entry { id, modifier });
        drop(active);
        self.memo.set(None);
        Ok(id)
    }

    /// Detach the modifier with the given id.
    ///
    /// Removing an id that is not attached is a hard failure: masking it
    /// would hide simulation bugs.
    pub fn remove_modifier(&self, id: ModifierId) -> VarResult<()> {
        let mut active = self.active.borrow_mut();
        let ActiveSet {
            entries, counts, ..
        } = &mut *active;
        let mut removed = None;
        let present = entries.remove_where(|entry| {
            if entry.id == id {
                removed = Some(entry.modifier.cadence());
                true
            } else {
                false
            }
        });
        if !present {
            return Err(VarError::ModifierNotFound);
        }
        if let Some(cadence) = removed {
            counts.remove(cadence);
        }
        drop(active);
        self.memo.set(None);
        Ok(())
    }

    /// Detach every modifier.
    pub fn clear_modifiers(&self) {
        let mut active = self.active.borrow_mut();
        active.entries.clear();
        active.counts.clear();
        drop(active);
        self.memo.set(None);
    }

    /// The current value: `clamp(base + Σ active modifiers, min, max)`.
    ///
    /// Returns the memoized value when the cadence allows it; otherwise
    /// recomputes, pruning expired modifiers in the same pass, and memoizes
    /// against the current virtual time.
    pub fn value(&self) -> f64 {
        let now = self.clock.now();
        let cadence = self.active.borrow().counts.aggregate();
        if let Some(memo) = self.memo.get() {
            let fresh = match cadence {
                Cadence::Never => true,
                Cadence::EachTick => memo.at == now,
                Cadence::Always => false,
            };
            if fresh {
                return memo.value;
            }
        }
        let value = self.recompute();
        self.memo.set(Some(Memo { value, at: now }));
        value
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

    /// Whether the clamped value sits at the lower bound.
    pub fn is_at_min(&self) -> bool {
        self.value() <= self.min
    }

    /// Whether the clamped value sits at the upper bound.
    pub fn is_at_max(&self) -> bool {
        self.value() >= self.max
    }

    /// Visit every active modifier, read-only, in attach order.
    pub fn for_each_modifier(&self, mut visit: impl FnMut(ModifierId, &dyn Modifier)) {
        for entry in self.active.borrow().entries.iter() {
            visit(entry.id, entry.modifier.as_ref());
        }
    }

    /// Active modifiers grouped by description, in first-appearance order,
    /// with per-group count and combined contribution.
    pub fn summarize(&self) -> Vec<ModifierGroup> {
        let active = self.active.borrow();
        let mut groups: Vec<ModifierGroup> = Vec::new();
        for entry in active.entries.iter() {
            if entry.modifier.can_be_removed() {
                continue;
            }
            let description = entry
                .modifier
                .description()
                .unwrap_or(ModifierGroup::UNLABELED);
            let value = entry.modifier.value();
            match groups.iter_mut().find(|g| g.description == description) {
                Some(group) => {
                    group.count += 1;
                    group.total += value;
                }
                None => groups.push(ModifierGroup {
                    description: description.to_string(),
                    count: 1,
                    total: value,
                }),
            }
        }
        groups
    }

    /// Whether any active modifier observes `variable` through a monitor
    /// chain.
    pub(crate) fn observes(&self, variable: &Rc<Variable>) -> bool {
        self.active
            .borrow()
            .entries
            .iter()
            .any(|entry| entry.modifier.depends_on(variable))
    }

    /// Sum live modifiers and prune expired ones in a single pass.
    fn recompute(&self) -> f64 {
        let mut active = self.active.borrow_mut();
        let ActiveSet {
            entries, counts, ..
        } = &mut *active;
        let mut sum = 0.0;
        let mut cursor = entries.keep_while(|entry| {
            if entry.modifier.can_be_removed() {
                counts.remove(entry.modifier.cadence());
                false
            } else {
                true
            }
        });
        while let Some(entry) = cursor.advance() {
            sum += entry.modifier.value();
        }
        drop(cursor);
        (self.base + sum).clamp(self.min, self.max)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(unit) => write!(f, "{:.1} {unit}", self.value()),
            None => write!(f, "{:.1}", self.value()),
        }
    }
}
