//! Panel backlight.
//!
//! Tracks the PWM duty as a percentage. Power saving dims the backlight
//! temporarily; [`Backlight::restore`] goes back to the saved level, which
//! only changes on a permanent [`Backlight::set_brightness`].

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Highest brightness level.
pub const MAX_BRIGHTNESS: u8 = 100;

/// Backlight levels in percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacklightConfig {
    /// Level restored at boot and after sleep.
    #[serde(default = "default_brightness")]
    pub brightness: u8,

    /// Level used while in sleep mode.
    #[serde(default = "default_sleep_brightness")]
    pub sleep_brightness: u8,
}

fn default_brightness() -> u8 {
    75
}

fn default_sleep_brightness() -> u8 {
    1
}

impl Default for BacklightConfig {
    fn default() -> Self {
        Self {
            brightness: default_brightness(),
            sleep_brightness: default_sleep_brightness(),
        }
    }
}

/// Backlight state. Starts dark until the first restore.
#[derive(Debug)]
pub struct Backlight {
    brightness: u8,
    saved: u8,
}

impl Backlight {
    pub fn new(saved: u8) -> Self {
        Self {
            brightness: 0,
            saved: saved.min(MAX_BRIGHTNESS),
        }
    }

    /// Current level.
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Level that [`Backlight::restore`] returns to.
    pub fn saved(&self) -> u8 {
        self.saved
    }

    /// Sets the level, clamped to [`MAX_BRIGHTNESS`]. A permanent change
    /// also becomes the saved level.
    pub fn set_brightness(&mut self, level: u8, permanent: bool) {
        let level = level.min(MAX_BRIGHTNESS);
        if permanent {
            self.saved = level;
        }
        if self.brightness != level {
            debug!("Backlight {} -> {}", self.brightness, level);
            self.brightness = level;
        }
    }

    /// Returns to the saved level.
    pub fn restore(&mut self) {
        self.set_brightness(self.saved, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dim_and_restore() {
        let mut backlight = Backlight::new(75);
        assert_eq!(backlight.brightness(), 0);
        backlight.restore();
        assert_eq!(backlight.brightness(), 75);

        backlight.set_brightness(1, false);
        assert_eq!(backlight.brightness(), 1);
        assert_eq!(backlight.saved(), 75);
        backlight.restore();
        assert_eq!(backlight.brightness(), 75);
    }

    #[test]
    fn test_permanent_change_is_restored() {
        let mut backlight = Backlight::new(75);
        backlight.set_brightness(40, true);
        backlight.set_brightness(0, false);
        backlight.restore();
        assert_eq!(backlight.brightness(), 40);
    }

    #[test]
    fn test_clamped() {
        let mut backlight = Backlight::new(250);
        assert_eq!(backlight.saved(), MAX_BRIGHTNESS);
        backlight.set_brightness(200, false);
        assert_eq!(backlight.brightness(), MAX_BRIGHTNESS);
    }

    #[test]
    fn test_defaults() {
        let config = BacklightConfig::default();
        assert_eq!(config.brightness, 75);
        assert_eq!(config.sleep_brightness, 1);
    }
}
