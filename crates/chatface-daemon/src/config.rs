//! Configuration management.

use anyhow::{Context, Result};
use chatface_core::{BoardVariant, FrameTableConfig, VariantOverrides, WrapPolicy};
use chatface_hw::{BacklightConfig, PanelConfig, PowerSaveConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Built-in board variant ("st7789" or "gc9107")
    #[serde(default = "default_variant")]
    pub variant: String,

    /// Emotion shown at boot and for unknown names
    #[serde(default)]
    pub default_emotion: Option<String>,

    /// What happens after the last frame of an emotion
    #[serde(default)]
    pub wrap: Option<WrapPolicy>,

    /// Interval at which the scene is rasterized to the panel, in milliseconds
    #[serde(default = "default_render_ms")]
    pub render_ms: u64,

    /// Logo frame handles, replacing the variant's logo
    #[serde(default)]
    pub logo_frames: Option<Vec<String>>,

    /// Timer and lock timing
    #[serde(default)]
    pub timing: TimingConfig,

    /// Frame table, replacing the variant's table
    #[serde(default)]
    pub frames: Option<FrameTableConfig>,

    /// Panel configuration; defaults to the variant's driver at native size
    #[serde(default)]
    pub panel: Option<PanelConfig>,

    /// Backlight levels
    #[serde(default)]
    pub backlight: BacklightConfig,

    /// Power-save thresholds
    #[serde(default)]
    pub power: PowerSaveConfig,

    /// Web server configuration
    #[serde(default)]
    pub web: WebConfig,
}

/// Timing overrides. Unset fields keep the variant's values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Logo frame period in milliseconds
    #[serde(default)]
    pub logo_ms: Option<u64>,

    /// Face period while the status bar is shown, in milliseconds
    #[serde(default)]
    pub active_ms: Option<u64>,

    /// Face period while the status bar is hidden, in milliseconds (0 = same as active)
    #[serde(default)]
    pub idle_ms: Option<u64>,

    /// How long a tick or setter waits for the display lock, in milliseconds
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            logo_ms: None,
            active_ms: None,
            idle_ms: None,
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Web server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Enable the HTTP control API
    #[serde(default = "default_web_enable")]
    pub enable: bool,

    /// Listen address (e.g., "127.0.0.1:8687")
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enable: default_web_enable(),
            listen: default_listen(),
        }
    }
}

// Default value functions
fn default_variant() -> String {
    "st7789".to_string()
}

fn default_render_ms() -> u64 {
    50
}

fn default_lock_timeout_ms() -> u64 {
    100
}

fn default_web_enable() -> bool {
    true
}

fn default_listen() -> String {
    "127.0.0.1:8687".to_string()
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse configuration")?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path.as_ref(), content).context("Failed to write configuration file")?;
        Ok(())
    }

    /// Variant overrides collected from the configuration.
    pub fn overrides(&self) -> VariantOverrides {
        VariantOverrides {
            logo_ms: self.timing.logo_ms,
            active_ms: self.timing.active_ms,
            idle_ms: self.timing.idle_ms,
            wrap: self.wrap,
            default_emotion: self.default_emotion.clone(),
            logo_frames: self.logo_frames.clone(),
            frames: self.frames.clone(),
        }
    }

    /// Resolves the board variant with all overrides applied.
    pub fn board_variant(&self) -> Result<BoardVariant> {
        let mut variant = BoardVariant::builtin(&self.variant).with_context(|| {
            format!(
                "Unknown variant '{}' (expected one of {:?})",
                self.variant,
                BoardVariant::builtin_names()
            )
        })?;
        variant
            .apply(&self.overrides())
            .context("Invalid variant overrides")?;
        Ok(variant)
    }

    /// Panel configuration for a variant.
    pub fn panel_config(&self, variant: &BoardVariant) -> PanelConfig {
        match &self.panel {
            Some(panel) => {
                if panel.driver != variant.panel {
                    warn!(
                        "Panel driver {} does not match variant {} ({})",
                        panel.driver, variant.name, variant.panel
                    );
                }
                panel.clone()
            }
            None => PanelConfig::for_driver(variant.panel),
        }
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.timing.lock_timeout_ms)
    }

    pub fn render_interval(&self) -> Duration {
        Duration::from_millis(self.render_ms.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variant: default_variant(),
            default_emotion: None,
            wrap: None,
            render_ms: default_render_ms(),
            logo_frames: None,
            timing: TimingConfig::default(),
            frames: None,
            panel: None,
            backlight: BacklightConfig::default(),
            power: PowerSaveConfig::default(),
            web: WebConfig::default(),
        }
    }
}
