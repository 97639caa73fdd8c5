//! Error types for the display core.

use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the display core.
#[derive(Error, Debug)]
pub enum Error {
    /// Emotion name is not one of the known names.
    #[error("Unknown emotion: {0}")]
    UnknownEmotion(String),

    /// No built-in board variant with this name.
    #[error("Unknown board variant: {0}")]
    UnknownVariant(String),

    /// A frame table refers to a group that was never defined.
    #[error("Frame group '{0}' is not defined")]
    UnknownFrameGroup(String),

    /// The boot logo has no frames.
    #[error("Logo sequence is empty")]
    EmptyLogo,

    /// A timer period that must be positive was zero.
    #[error("{0} must be greater than zero")]
    ZeroPeriod(&'static str),

    /// The toolkit failed to create or configure a scene object.
    #[error("Display surface error: {0}")]
    Surface(String),

    /// A timer could not be created, armed or stopped.
    #[error("Timer '{name}' error: {reason}")]
    Timer { name: &'static str, reason: String },

    /// The display lock was not acquired in time.
    #[error("Display lock not acquired within {0:?}")]
    LockTimeout(Duration),

    /// Board bring-up failure.
    #[error("Hardware error: {0}")]
    Hardware(#[from] chatface_hw::Error),
}
