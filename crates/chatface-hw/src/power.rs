//! Power-save timer.
//!
//! Counts idle seconds while running on battery and reports the
//! transitions; the board decides what each one does to the backlight,
//! the face and the panel. Sleep starts after `sleep_after_secs` and
//! shutdown after `shutdown_after_secs`. Activity after either reports
//! [`PowerEvent::ExitSleep`]. Charging disables the timer.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Power-save thresholds. A zero threshold disables that stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerSaveConfig {
    /// Idle seconds before entering sleep mode.
    #[serde(default = "default_sleep_after")]
    pub sleep_after_secs: u32,

    /// Idle seconds before requesting shutdown.
    #[serde(default = "default_shutdown_after")]
    pub shutdown_after_secs: u32,
}

fn default_sleep_after() -> u32 {
    150
}

fn default_shutdown_after() -> u32 {
    300
}

impl Default for PowerSaveConfig {
    fn default() -> Self {
        Self {
            sleep_after_secs: default_sleep_after(),
            shutdown_after_secs: default_shutdown_after(),
        }
    }
}

/// Transitions reported by the power-save timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerEvent {
    /// Idle for `sleep_after_secs`.
    EnterSleep,
    /// Activity after sleep or shutdown.
    ExitSleep,
    /// Idle for `shutdown_after_secs`.
    Shutdown,
}

/// Idle-time state machine driven by a one-second tick.
#[derive(Debug)]
pub struct PowerSaveTimer {
    config: PowerSaveConfig,
    enabled: bool,
    idle_secs: u32,
    sleeping: bool,
    shutdown_requested: bool,
}

impl PowerSaveTimer {
    /// Creates a disabled timer.
    pub fn new(config: PowerSaveConfig) -> Self {
        Self {
            config,
            enabled: false,
            idle_secs: 0,
            sleeping: false,
            shutdown_requested: false,
        }
    }

    /// Returns true if the timer is counting.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns true while in sleep mode.
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Enables or disables the timer. Disabling while asleep wakes up.
    pub fn set_enabled(&mut self, enabled: bool) -> Option<PowerEvent> {
        if self.enabled == enabled {
            return None;
        }
        self.enabled = enabled;
        debug!("Power-save timer {}", if enabled { "enabled" } else { "disabled" });
        self.reset()
    }

    /// Updates charging status; charging disables power saving.
    pub fn on_charging_changed(&mut self, charging: bool) -> Option<PowerEvent> {
        self.set_enabled(!charging)
    }

    /// Records user activity.
    pub fn wake_up(&mut self) -> Option<PowerEvent> {
        self.reset()
    }

    /// Advances the idle counter by one second.
    pub fn tick(&mut self) -> Option<PowerEvent> {
        if !self.enabled {
            return None;
        }
        self.idle_secs = self.idle_secs.saturating_add(1);

        let shutdown_after = self.config.shutdown_after_secs;
        if shutdown_after > 0 && self.idle_secs >= shutdown_after && !self.shutdown_requested {
            self.shutdown_requested = true;
            info!("Idle for {}s, requesting shutdown", self.idle_secs);
            return Some(PowerEvent::Shutdown);
        }

        let sleep_after = self.config.sleep_after_secs;
        if sleep_after > 0 && self.idle_secs >= sleep_after && !self.sleeping {
            self.sleeping = true;
            info!("Idle for {}s, entering sleep mode", self.idle_secs);
            return Some(PowerEvent::EnterSleep);
        }

        None
    }

    /// Returns true once shutdown was reported and no activity followed.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown_requested
    }

    fn reset(&mut self) -> Option<PowerEvent> {
        self.idle_secs = 0;
        let woke = self.sleeping || self.shutdown_requested;
        self.sleeping = false;
        self.shutdown_requested = false;
        woke.then_some(PowerEvent::ExitSleep)
    }
}
