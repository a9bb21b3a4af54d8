//! Error types for the valuation engine.

/// Convenience result type for engine operations.
pub type VarResult<T> = Result<T, VarError>;

/// Errors that can occur when constructing or mutating variables and
/// modifiers.
///
/// Construction-time variants are unrecoverable programmer errors; runtime
/// variants signal misuse that would corrupt simulated state if masked.
/// A modifier's natural expiration is never an error — it is reported by
/// `can_be_removed` and handled by pruning.
#[derive(Debug, thiserror::Error)]
pub enum VarError {
    /// A variable was constructed with `min >= max`.
    #[error("invalid bounds: min {min} must be less than max {max}")]
    InvalidBounds {
        /// The rejected lower bound.
        min: f64,
        /// The rejected upper bound.
        max: f64,
    },

    /// A lifetime duration was zero, negative, or non-finite.
    #[error("duration must be positive and finite, got {duration}")]
    NonPositiveDuration {
        /// The rejected duration, in virtual units.
        duration: f64,
    },

    /// A decay half-life was zero, negative, or non-finite.
    #[error("half-life must be positive and finite, got {half_life}")]
    NonPositiveHalfLife {
        /// The rejected half-life, in virtual units.
        half_life: f64,
    },

    /// An exponential decay was given a zero initial value.
    #[error("decay initial value must be non-zero")]
    ZeroInitialValue,

    /// A decay's insignificance threshold sits on the other side of zero
    /// from its initial value, so the decay can never cross it.
    #[error("threshold {threshold} can never be crossed decaying from {initial} toward zero")]
    ThresholdSignMismatch {
        /// The decay's initial value.
        initial: f64,
        /// The rejected threshold.
        threshold: f64,
    },

    /// A fuel quantity was zero, negative, or non-finite.
    #[error("fuel quantity must be positive and finite, got {quantity}")]
    NonPositiveQuantity {
        /// The rejected quantity.
        quantity: f64,
    },

    /// An externally driven progress value was moved backward.
    #[error("progress only moves forward, got delta {delta}")]
    ProgressMovedBackward {
        /// The rejected progress delta.
        delta: f64,
    },

    /// A modifier id was not found on the variable it was removed from.
    #[error("modifier not attached to this variable")]
    ModifierNotFound,

    /// A monitoring modifier was built with no source variables.
    #[error("monitor requires at least one source variable")]
    NoSources,

    /// A linear remap was built over a variable with an infinite bound.
    #[error("remap source must have finite bounds")]
    UnboundedSource,

    /// Attaching the modifier would let the variable observe itself.
    #[error("modifier would observe its own owner")]
    DependencyCycle,
}
