//! Recompute policies and their aggregation.

use serde::{Deserialize, Serialize};

/// How often a variable must refresh its memoized value.
///
/// Ordered by demand: `Never < EachTick < Always`. A variable's effective
/// cadence is the maximum over its active modifiers, so a single live-derived
/// modifier forces recomputation on every query while a lone permanent bonus
/// costs O(1) per query after the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cadence {
    /// Recompute only when the modifier set changes.
    Never,
    /// Recompute at most once per distinct virtual-time value.
    EachTick,
    /// Recompute on every query.
    Always,
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Never => write!(f, "never"),
            Self::EachTick => write!(f, "each-tick"),
            Self::Always => write!(f, "always"),
        }
    }
}

/// Per-cadence counters for one variable's active modifiers.
///
/// Kept incrementally on add/remove/prune so the aggregated cadence is an
/// O(1) read instead of a rescan of the modifier collection.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CadenceCounts {
    never: u32,
    each_tick: u32,
    always: u32,
}

impl CadenceCounts {
    pub(crate) fn add(&mut self, cadence: Cadence) {
        match cadence {
            Cadence::Never => self.never += 1,
            Cadence::EachTick => self.each_tick += 1,
            Cadence::Always => self.always += 1,
        }
    }

    pub(crate) fn remove(&mut self, cadence: Cadence) {
        let slot = match cadence {
            Cadence::Never => &mut self.never,
            Cadence::EachTick => &mut self.each_tick,
            Cadence::Always => &mut self.always,
        };
        debug_assert!(*slot > 0);
        *slot = slot.saturating_sub(1);
    }

    /// The most demanding cadence with a live count.
    pub(crate) fn aggregate(&self) -> Cadence {
        if self.always > 0 {
            Cadence::Always
        } else if self.each_tick > 0 {
            Cadence::EachTick
        } else {
            Cadence::Never
        }
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_orders_by_demand() {
        assert!(Cadence::Never < Cadence::EachTick);
        assert!(Cadence::EachTick < Cadence::Always);
        assert_eq!(Cadence::Never.max(Cadence::Always), Cadence::Always);
    }

    #[test]
    fn counts_track_the_maximum() {
        let mut counts = CadenceCounts::default();
        assert_eq!(counts.aggregate(), Cadence::Never);

        counts.add(Cadence::EachTick);
        counts.add(Cadence::Always);
        assert_eq!(counts.aggregate(), Cadence::Always);

        counts.remove(Cadence::Always);
        assert_eq!(counts.aggregate(), Cadence::EachTick);

        counts.remove(Cadence::EachTick);
        assert_eq!(counts.aggregate(), Cadence::Never);
    }

    #[test]
    fn clear_resets_counts() {
        let mut counts = CadenceCounts::default();
        counts.add(Cadence::Always);
        counts.clear();
        assert_eq!(counts.aggregate(), Cadence::Never);
    }

    #[test]
    fn display_names() {
        assert_eq!(Cadence::Never.to_string(), "never");
        assert_eq!(Cadence::EachTick.to_string(), "each-tick");
        assert_eq!(Cadence::Always.to_string(), "always");
    }
}
