//! Error types for the clock crate.

/// Convenience result type for clock operations.
pub type ClockResult<T> = Result<T, ClockError>;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// A callback was scheduled at the never sentinel time.
    #[error("cannot schedule a callback at the never sentinel")]
    ScheduledNever,

    /// A wait was requested for the never sentinel time.
    #[error("cannot wait for the never sentinel")]
    WaitForNever,

    /// `advance` was called with a negative or non-finite delta, or a
    /// non-positive or non-finite fast-forward multiplier.
    #[error("invalid advance: delta {delta} ms, fast-forward {fast_forward}")]
    InvalidAdvance {
        /// The rejected real-time delta, in milliseconds.
        delta: f64,
        /// The rejected fast-forward multiplier.
        fast_forward: f64,
    },

    /// `advance` was re-entered from inside a firing callback.
    #[error("advance re-entered from inside a firing callback")]
    ReentrantAdvance,
}
