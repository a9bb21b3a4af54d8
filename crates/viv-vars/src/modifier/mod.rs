//! Value contributors with a lifetime predicate.
//!
//! A modifier is owned by exactly one variable, queried on every recompute
//! of its owner, and pruned once its lifetime is over. Each variant in the
//! submodules covers one lifetime shape: fixed (optionally expiring),
//! decaying over elapsed time, advanced by an external driver, or derived
//! live from other variables.

/// Fixed-delta contributions, optionally expiring.
pub mod constant;
/// Contributions that follow a curve over elapsed time.
pub mod decay;
/// Contributions derived live from other variables.
pub mod monitor;
/// Contributions advanced explicitly by an external driver.
pub mod progress;

pub use constant::ConstantModifier;
pub use decay::DecayingModifier;
pub use monitor::MonitorModifier;
pub use progress::{ProgressDriver, ProgressModifier};

use std::rc::Rc;

use crate::cadence::Cadence;
use crate::variable::Variable;

/// A timed or conditional contribution to a variable's computed value.
///
/// Implementations are exclusively owned by the variable they are attached
/// to. Expiration is not an error: it is reported through
/// [`can_be_removed`](Self::can_be_removed) and handled by the owner's
/// pruning pass.
pub trait Modifier {
    /// Human-readable label used by inspector summaries. Has no effect on
    /// computation.
    fn description(&self) -> Option<&str> {
        None
    }

    /// The modifier's current contribution.
    fn value(&self) -> f64;

    /// Whether the modifier's lifetime is over and it can be pruned.
    fn can_be_removed(&self) -> bool;

    /// How often an owning variable must recompute while this modifier is
    /// active.
    fn cadence(&self) -> Cadence;

    /// Whether this modifier reads `variable`, directly or through other
    /// monitoring modifiers. Used to reject dependency cycles at attach
    /// time.
    fn depends_on(&self, variable: &Rc<Variable>) -> bool {
        let _ = variable;
        false
    }
}
