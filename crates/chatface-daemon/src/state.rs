//! Application state management.

use anyhow::{Context, Result};
use chatface_core::{ChatDisplay, DisplayStatus, Emotion, TimerDriver};
use chatface_hw::{
    bring_up, AppCommand, Backlight, Button, ButtonEvent, PowerEvent, PowerSaveTimer, SimPanel,
};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::surface::SceneSurface;

const VOLUME_STEP: u8 = 10;
const VOLUME_MAX: u8 = 100;
const DEFAULT_VOLUME: u8 = 70;

/// Audio-side state driven by the buttons.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AudioState {
    pub listening: bool,
    pub volume: u8,
}

impl Default for AudioState {
    fn default() -> Self {
        Self {
            listening: false,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl AudioState {
    fn apply(&mut self, command: AppCommand) {
        match command {
            AppCommand::StartListening => self.listening = true,
            AppCommand::StopListening => self.listening = false,
            AppCommand::VolumeUp => {
                self.volume = self.volume.saturating_add(VOLUME_STEP).min(VOLUME_MAX)
            }
            AppCommand::VolumeDown => self.volume = self.volume.saturating_sub(VOLUME_STEP),
        }
    }
}

/// Full status reported over the API.
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub variant: String,
    #[serde(flatten)]
    pub display: DisplayStatus,
    pub audio: AudioState,
    pub sleeping: bool,
    pub panel_on: bool,
    pub brightness: u8,
    pub logo_image: Option<String>,
    pub face_image: Option<String>,
    pub frames_flushed: u64,
}

/// Shared application state.
pub struct AppState {
    variant: String,
    display: ChatDisplay<SceneSurface>,
    power: Mutex<PowerSaveTimer>,
    backlight: Mutex<Backlight>,
    sleep_brightness: u8,
    audio: Mutex<AudioState>,
}

impl AppState {
    /// Brings up the simulated board and starts the boot logo.
    ///
    /// Must be called inside a tokio runtime when the timer driver needs one.
    pub fn new(config: Config, timers: Arc<dyn TimerDriver>) -> Result<Self> {
        let variant = config.board_variant()?;
        let panel_config = config.panel_config(&variant);

        let mut panel = SimPanel::new(&panel_config);
        bring_up(&mut panel, &panel_config).context("Failed to bring up panel")?;
        let surface = SceneSurface::new(panel)?;

        let name = variant.name.clone();
        let display = ChatDisplay::new(surface, variant, timers, config.lock_timeout())
            .context("Failed to create display")?;

        let mut backlight = Backlight::new(config.backlight.brightness);
        backlight.restore();

        // The simulator runs on battery until told otherwise.
        let mut power = PowerSaveTimer::new(config.power.clone());
        power.on_charging_changed(false);

        info!("Board '{}' up", name);
        Ok(Self {
            variant: name,
            display,
            power: Mutex::new(power),
            backlight: Mutex::new(backlight),
            sleep_brightness: config.backlight.sleep_brightness,
            audio: Mutex::new(AudioState::default()),
        })
    }

    #[cfg(test)]
    pub fn display(&self) -> &ChatDisplay<SceneSurface> {
        &self.display
    }

    /// Switches the face to an emotion by name.
    pub fn set_face(&self, name: &str) -> Result<Emotion> {
        let emotion = self.display.set_face(name)?;
        Ok(emotion)
    }

    pub fn set_status_hidden(&self, hidden: bool) -> Result<()> {
        self.display.set_status_hidden(hidden)?;
        Ok(())
    }

    /// Returns the current status.
    pub fn status(&self) -> Result<Status> {
        let display = self.display.state()?;
        let status = self.display.with_surface(|surface| Status {
            variant: self.variant.clone(),
            display,
            audio: *self.audio.lock(),
            sleeping: self.power.lock().is_sleeping(),
            panel_on: surface.panel_on(),
            brightness: self.backlight.lock().brightness(),
            logo_image: surface.logo_image().map(|image| image.to_string()),
            face_image: surface.face_image().map(|image| image.to_string()),
            frames_flushed: surface.frames_flushed(),
        })?;
        Ok(status)
    }

    /// Handles a button event. Every event counts as user activity.
    pub fn handle_button(&self, button: Button, event: ButtonEvent) -> Result<Option<AppCommand>> {
        let power_event = self.power.lock().wake_up();
        if let Some(power_event) = power_event {
            self.apply_power_event(power_event)?;
        }

        let command = button.command(event);
        match command {
            Some(command) => {
                info!("Button {} {:?}: {:?}", button, event, command);
                self.audio.lock().apply(command);
            }
            None => debug!("Button {} {:?} ignored", button, event),
        }
        Ok(command)
    }

    /// Sets the charging status; charging disables power saving.
    pub fn set_charging(&self, charging: bool) -> Result<()> {
        let power_event = self.power.lock().on_charging_changed(charging);
        if let Some(power_event) = power_event {
            self.apply_power_event(power_event)?;
        }
        Ok(())
    }

    /// Sets and saves the backlight level. Returns the clamped level.
    pub fn set_brightness(&self, level: u8) -> u8 {
        let mut backlight = self.backlight.lock();
        backlight.set_brightness(level, true);
        info!("Backlight set to {}", backlight.brightness());
        backlight.brightness()
    }

    /// Advances the power-save timer by one second.
    pub fn power_tick(&self) -> Result<Option<PowerEvent>> {
        let power_event = self.power.lock().tick();
        if let Some(power_event) = power_event {
            self.apply_power_event(power_event)?;
        }
        Ok(power_event)
    }

    fn apply_power_event(&self, event: PowerEvent) -> Result<()> {
        match event {
            PowerEvent::EnterSleep => {
                self.display.set_face("sleepy")?;
                self.backlight
                    .lock()
                    .set_brightness(self.sleep_brightness, false);
            }
            PowerEvent::ExitSleep => {
                self.display.set_face("neutral")?;
                self.display
                    .with_surface(|surface| surface.panel_resume())??;
                self.backlight.lock().restore();
            }
            PowerEvent::Shutdown => {
                warn!("Power save shutdown, switching panel off");
                self.display.with_surface(|surface| surface.panel_off())??;
                self.backlight.lock().set_brightness(0, false);
            }
        }
        Ok(())
    }

    /// Pushes the scene to the panel if it changed.
    pub fn render(&self) -> Result<bool> {
        self.display.with_surface(|surface| surface.flush())?
    }

    /// Returns the panel image as PNG bytes.
    pub fn screen_png(&self) -> Result<Vec<u8>> {
        self.display
            .with_surface(|surface| surface.screenshot_png())?
    }

    /// Stops the timers and releases the panel.
    pub fn shutdown(&self) {
        self.display.teardown();
        self.backlight.lock().set_brightness(0, false);
    }
}
