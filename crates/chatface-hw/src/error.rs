//! Error types for the chatface hardware boundary.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while bringing up or driving the board.
#[derive(Error, Debug)]
pub enum Error {
    /// A step of the panel bring-up sequence failed.
    #[error("Panel bring-up failed at '{step}': {reason}")]
    BringUp { step: &'static str, reason: String },

    /// The panel was used before `init` succeeded.
    #[error("Panel is not initialized")]
    PanelNotInitialized,

    /// The panel has been switched off or released.
    #[error("Panel is off")]
    PanelOff,

    /// A bitmap write fell outside the panel.
    #[error("Bitmap region ({x_start},{y_start})..({x_end},{y_end}) outside {width}x{height} panel")]
    BitmapOutOfBounds {
        x_start: u16,
        y_start: u16,
        x_end: u16,
        y_end: u16,
        width: u16,
        height: u16,
    },

    /// Pixel slice length does not match the target region.
    #[error("Pixel count mismatch: expected {expected}, got {actual}")]
    PixelCount { expected: usize, actual: usize },

    /// Invalid rotation value.
    #[error("Invalid rotation: {0}")]
    InvalidRotation(String),

    /// Unknown panel driver chip.
    #[error("Unknown panel driver: {0}")]
    UnknownDriver(String),

    /// Unknown button name.
    #[error("Unknown button: {0}")]
    UnknownButton(String),

    /// Unknown button event name.
    #[error("Unknown button event: {0}")]
    UnknownButtonEvent(String),
}
