//! chatface hardware boundary
//!
//! Board bring-up for the chatface gadget as seen from the display core:
//! LCD panel operations and their bring-up sequence, the backlight, button
//! wiring and the power-save timer. The vendor SDK sits behind the
//! [`Panel`] trait; a RAM-backed [`SimPanel`] stands in for it on the host.

pub mod backlight;
pub mod button;
pub mod error;
pub mod panel;
pub mod power;
pub mod rotation;

pub use backlight::{Backlight, BacklightConfig, MAX_BRIGHTNESS};
pub use button::{AppCommand, Button, ButtonEvent};
pub use error::{Error, Result};
pub use panel::{bring_up, Panel, PanelConfig, PanelDriver, SimPanel, SpiBusConfig};
pub use power::{PowerEvent, PowerSaveConfig, PowerSaveTimer};
pub use rotation::Rotation;

/// RGB565 white, used to blank the panel during bring-up.
pub const COLOR_WHITE: u16 = 0xFFFF;

/// RGB565 black.
pub const COLOR_BLACK: u16 = 0x0000;
