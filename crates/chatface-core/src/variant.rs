//! Board variants.
//!
//! A variant bundles everything that differs between boards: the panel
//! driver, boot logo, face cadence, frame table and wrap policy. The two
//! built-in variants match the shipped boards; configuration can override
//! any part of them.

use crate::{
    AssetTable, CadenceConfig, Emotion, Error, FrameSet, FrameTableConfig, Result, WrapPolicy,
};
use chatface_hw::PanelDriver;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Configuration for one board.
#[derive(Debug, Clone)]
pub struct BoardVariant {
    pub name: String,
    pub panel: PanelDriver,
    pub logo: FrameSet,
    pub logo_period: Duration,
    pub cadence: CadenceConfig,
    pub frames: AssetTable,
    pub default_emotion: Emotion,
    pub wrap: WrapPolicy,
}

/// Converts a period override, rejecting zero.
fn period(field: &'static str, ms: u64) -> Result<Duration> {
    if ms == 0 {
        return Err(Error::ZeroPeriod(field));
    }
    Ok(Duration::from_millis(ms))
}

/// Builds `prefix{i}` handles for each index.
fn frames(prefix: &str, indices: impl IntoIterator<Item = u32>) -> FrameSet {
    indices
        .into_iter()
        .map(|i| format!("{}{}", prefix, i))
        .collect()
}

impl BoardVariant {
    /// 240x240 ST7789 board.
    pub fn st7789() -> Self {
        let mut table = AssetTable::new(frames("neutral", 1..=8));
        table
            .bind(
                &[
                    Emotion::Happy,
                    Emotion::Laughing,
                    Emotion::Funny,
                    Emotion::Kissy,
                ],
                frames("happy", 1..=6),
            )
            .bind(&[Emotion::Sad], frames("sad", 1..=8))
            .bind(&[Emotion::Angry], frames("angry", 1..=7))
            .bind(&[Emotion::Loving], frames("loving", 1..=6))
            .bind(
                &[Emotion::Sleepy, Emotion::Embarrassed],
                frames("embarrassed", 1..=4),
            );

        Self {
            name: "st7789".to_string(),
            panel: PanelDriver::St7789,
            logo: frames("bootlogo", 1..=21),
            logo_period: Duration::from_millis(120),
            cadence: CadenceConfig::fixed(Duration::from_millis(300)),
            frames: table,
            default_emotion: Emotion::Neutral,
            wrap: WrapPolicy::Loop,
        }
    }

    /// 128x128 GC9107 board. Reactions play once, then return to neutral.
    pub fn gc9107() -> Self {
        // Rise then fall back through the same frames.
        let bounce = |prefix: &str, peak: u32, back_from: u32| {
            frames(prefix, (1..=peak).chain((1..=back_from).rev()))
        };

        let mut table = AssetTable::new(frames(
            "default",
            [1, 2, 3, 4, 5, 6, 7, 8, 7, 5, 4, 3, 2, 1],
        ));
        table
            .bind(&[Emotion::Neutral], frames("neutral", 1..=14))
            .bind(
                &[Emotion::Happy, Emotion::Laughing, Emotion::Funny],
                frames("happy", 1..=16),
            )
            .bind(&[Emotion::Sad], frames("sad", 1..=16))
            .bind(&[Emotion::Angry], bounce("angry", 8, 7))
            .bind(&[Emotion::Loving], bounce("loving", 9, 7))
            .bind(
                &[Emotion::Embarrassed],
                frames("embarrassed", [1, 2, 3, 4, 5, 6, 5, 4, 4, 5, 4, 3, 2, 1]),
            )
            .bind(&[Emotion::Crying], FrameSet::blank());

        Self {
            name: "gc9107".to_string(),
            panel: PanelDriver::Gc9107,
            logo: frames("bootlogo", 1..=22),
            logo_period: Duration::from_millis(130),
            cadence: CadenceConfig::fixed(Duration::from_millis(220)),
            frames: table,
            default_emotion: Emotion::Neutral,
            wrap: WrapPolicy::Revert,
        }
    }

    /// Names accepted by [`BoardVariant::builtin`].
    pub fn builtin_names() -> &'static [&'static str] {
        &["st7789", "gc9107"]
    }

    /// Looks up a built-in variant by name.
    pub fn builtin(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "st7789" => Ok(Self::st7789()),
            "gc9107" => Ok(Self::gc9107()),
            _ => Err(Error::UnknownVariant(name.to_string())),
        }
    }

    /// Applies configuration overrides.
    pub fn apply(&mut self, overrides: &VariantOverrides) -> Result<()> {
        if let Some(ms) = overrides.logo_ms {
            self.logo_period = period("logo_ms", ms)?;
        }
        if let Some(ms) = overrides.active_ms {
            self.cadence.active = period("active_ms", ms)?;
        }
        if let Some(ms) = overrides.idle_ms {
            // Zero turns adaptive cadence off.
            self.cadence.idle = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(wrap) = overrides.wrap {
            self.wrap = wrap;
        }
        if let Some(name) = &overrides.default_emotion {
            self.default_emotion = name.parse()?;
        }
        if let Some(logo) = &overrides.logo_frames {
            if logo.is_empty() {
                return Err(Error::EmptyLogo);
            }
            self.logo = logo.iter().map(String::as_str).collect();
        }
        if let Some(table) = &overrides.frames {
            self.frames = AssetTable::from_config(table)?;
        }
        debug!("Variant {} after overrides: {:?}", self.name, self.cadence);
        Ok(())
    }
}

/// Per-field overrides of a built-in variant. Unset fields keep the
/// built-in value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantOverrides {
    /// Logo frame period in milliseconds.
    #[serde(default)]
    pub logo_ms: Option<u64>,

    /// Face period while the status area is shown, in milliseconds.
    #[serde(default)]
    pub active_ms: Option<u64>,

    /// Face period while the status area is hidden, in milliseconds.
    #[serde(default)]
    pub idle_ms: Option<u64>,

    #[serde(default)]
    pub wrap: Option<WrapPolicy>,

    #[serde(default)]
    pub default_emotion: Option<String>,

    /// Logo frame handles.
    #[serde(default)]
    pub logo_frames: Option<Vec<String>>,

    /// Replacement frame table.
    #[serde(default)]
    pub frames: Option<FrameTableConfig>,
}
