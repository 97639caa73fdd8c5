//! Button wiring.
//!
//! The board has a boot button and two volume buttons. Their events are
//! translated into application commands; the display core never sees them.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Physical buttons on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Button {
    /// Boot / push-to-talk button.
    Boot,
    /// Volume up.
    VolumeUp,
    /// Volume down.
    VolumeDown,
}

/// Events reported by the button driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ButtonEvent {
    /// Button went down.
    PressDown,
    /// Button was released.
    PressUp,
    /// Short press and release.
    Click,
}

/// Application-level commands produced by the buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppCommand {
    /// Open the microphone.
    StartListening,
    /// Close the microphone.
    StopListening,
    /// Raise output volume.
    VolumeUp,
    /// Lower output volume.
    VolumeDown,
}

impl Button {
    /// Translates a button event into an application command.
    ///
    /// Events without a binding return `None`.
    pub fn command(&self, event: ButtonEvent) -> Option<AppCommand> {
        match (self, event) {
            (Button::Boot, ButtonEvent::PressDown) => Some(AppCommand::StartListening),
            (Button::Boot, ButtonEvent::PressUp) => Some(AppCommand::StopListening),
            (Button::VolumeUp, ButtonEvent::Click) => Some(AppCommand::VolumeUp),
            (Button::VolumeDown, ButtonEvent::Click) => Some(AppCommand::VolumeDown),
            _ => None,
        }
    }
}

impl FromStr for Button {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "boot" => Ok(Button::Boot),
            "volume-up" | "volume_up" | "vol-up" => Ok(Button::VolumeUp),
            "volume-down" | "volume_down" | "vol-down" => Ok(Button::VolumeDown),
            _ => Err(Error::UnknownButton(s.to_string())),
        }
    }
}

impl FromStr for ButtonEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "press-down" | "press_down" | "down" => Ok(ButtonEvent::PressDown),
            "press-up" | "press_up" | "up" => Ok(ButtonEvent::PressUp),
            "click" => Ok(ButtonEvent::Click),
            _ => Err(Error::UnknownButtonEvent(s.to_string())),
        }
    }
}

impl std::fmt::Display for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Button::Boot => write!(f, "boot"),
            Button::VolumeUp => write!(f, "volume-up"),
            Button::VolumeDown => write!(f, "volume-down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_push_to_talk() {
        assert_eq!(
            Button::Boot.command(ButtonEvent::PressDown),
            Some(AppCommand::StartListening)
        );
        assert_eq!(
            Button::Boot.command(ButtonEvent::PressUp),
            Some(AppCommand::StopListening)
        );
        assert_eq!(Button::Boot.command(ButtonEvent::Click), None);
    }

    #[test]
    fn test_volume_buttons() {
        assert_eq!(
            Button::VolumeUp.command(ButtonEvent::Click),
            Some(AppCommand::VolumeUp)
        );
        assert_eq!(
            Button::VolumeDown.command(ButtonEvent::Click),
            Some(AppCommand::VolumeDown)
        );
        assert_eq!(Button::VolumeUp.command(ButtonEvent::PressDown), None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("boot".parse::<Button>().unwrap(), Button::Boot);
        assert_eq!("vol-up".parse::<Button>().unwrap(), Button::VolumeUp);
        assert_eq!(
            "press-down".parse::<ButtonEvent>().unwrap(),
            ButtonEvent::PressDown
        );
        assert!("menu".parse::<Button>().is_err());
        assert!("hold".parse::<ButtonEvent>().is_err());
    }
}
