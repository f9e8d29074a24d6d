//! Frame errors.

use crate::game::field::Time;

/// Rejected frame input. The prior frame is left untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    /// Elapsed duration below zero.
    #[error("invalid frame input: negative duration {0} ms")]
    NegativeDuration(f64),

    /// NaN or infinite frame time or duration.
    #[error("invalid frame input: non-finite time or duration")]
    NonFiniteInput,

    /// New frame time earlier than the stored one.
    #[error("invalid frame input: frame time {requested} precedes current frame time {previous}")]
    FrameTimeRegressed {
        /// Stored frame time
        previous: Time,
        /// Requested frame time
        requested: Time,
    },
}
