//! Variable/modifier valuation engine for vivarium.
//!
//! Simulates time-varying numeric attributes — hunger, mood, temperature,
//! remaining fuel — as bounded variables whose value is a base plus the sum
//! of active modifiers, clamped and memoized under a policy derived from the
//! modifiers themselves. Time comes exclusively from an injected
//! [`viv_clock::SimClock`]; the engine performs no I/O, no rendering, and no
//! threading, and exposes query/mutation methods for the surrounding game
//! logic and inspector UI to call.

/// Recompute policies and their aggregation.
pub mod cadence;
/// Error types for the valuation engine.
pub mod error;
/// Bounded attributes fed by priority-ordered fuel.
pub mod furnace;
/// Value contributors with a lifetime predicate.
pub mod modifier;
/// Inspector-facing summaries of a variable's active modifiers.
pub mod summary;
/// Bounded, time-varying numeric attributes.
pub mod variable;

/// Re-export of [`cadence::Cadence`].
pub use cadence::Cadence;
/// Re-exports of [`error::VarError`] and [`error::VarResult`].
pub use error::{VarError, VarResult};
/// Re-export of [`furnace::FurnaceVariable`].
pub use furnace::FurnaceVariable;
/// Re-exports of the modifier trait and its variants.
pub use modifier::{
    ConstantModifier, DecayingModifier, Modifier, MonitorModifier, ProgressDriver,
    ProgressModifier,
};
/// Re-export of [`summary::ModifierGroup`].
pub use summary::ModifierGroup;
/// Re-exports of [`variable::Variable`] and [`variable::ModifierId`].
pub use variable::{ModifierId, Variable};
