//! Panel driver capability and the bring-up sequence.

use crate::rotation::Rotation;
use crate::{Error, Result, COLOR_WHITE};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info};

/// LCD controller chip fitted to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelDriver {
    /// Sitronix ST7789, 240x240.
    #[default]
    St7789,
    /// GalaxyCore GC9107, 128x128.
    Gc9107,
}

impl PanelDriver {
    /// Returns the native panel resolution.
    pub fn native_resolution(&self) -> (u16, u16) {
        match self {
            PanelDriver::St7789 => (240, 240),
            PanelDriver::Gc9107 => (128, 128),
        }
    }
}

impl FromStr for PanelDriver {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "st7789" => Ok(PanelDriver::St7789),
            "gc9107" => Ok(PanelDriver::Gc9107),
            _ => Err(Error::UnknownDriver(s.to_string())),
        }
    }
}

impl std::fmt::Display for PanelDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PanelDriver::St7789 => write!(f, "st7789"),
            PanelDriver::Gc9107 => write!(f, "gc9107"),
        }
    }
}

/// Panel operations provided by the vendor LCD driver.
///
/// Regions passed to [`Panel::draw_bitmap`] are in logical coordinates
/// (after rotation) with exclusive end bounds.
pub trait Panel: Send {
    /// Pulses the reset line.
    fn reset(&mut self) -> Result<()>;

    /// Sends the controller initialization sequence.
    fn init(&mut self) -> Result<()>;

    /// Enables or disables X/Y axis swapping.
    fn swap_xy(&mut self, swap: bool) -> Result<()>;

    /// Sets the mirror flags.
    fn mirror(&mut self, mirror_x: bool, mirror_y: bool) -> Result<()>;

    /// Enables or disables color inversion.
    fn invert_color(&mut self, invert: bool) -> Result<()>;

    /// Sets the offset of the visible area inside controller RAM.
    fn set_gap(&mut self, x: u16, y: u16) -> Result<()>;

    /// Writes RGB565 pixels into a rectangular region.
    fn draw_bitmap(
        &mut self,
        x_start: u16,
        y_start: u16,
        x_end: u16,
        y_end: u16,
        pixels: &[u16],
    ) -> Result<()>;

    /// Switches the display output on or off.
    fn display_on(&mut self, on: bool) -> Result<()>;

    /// Returns the logical dimensions (after rotation).
    fn dimensions(&self) -> (u16, u16);
}

/// SPI bus and control line assignment for the panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiBusConfig {
    /// MOSI GPIO.
    #[serde(default = "default_mosi")]
    pub mosi: u8,
    /// Clock GPIO.
    #[serde(default = "default_sclk")]
    pub sclk: u8,
    /// Chip-select GPIO.
    #[serde(default = "default_cs")]
    pub cs: u8,
    /// Data/command GPIO.
    #[serde(default = "default_dc")]
    pub dc: u8,
    /// Reset GPIO, if wired.
    #[serde(default)]
    pub reset: Option<u8>,
    /// Pixel clock in Hz.
    #[serde(default = "default_pclk_hz")]
    pub pclk_hz: u32,
    /// SPI mode (0-3).
    #[serde(default = "default_spi_mode")]
    pub spi_mode: u8,
}

fn default_mosi() -> u8 {
    47
}

fn default_sclk() -> u8 {
    21
}

fn default_cs() -> u8 {
    14
}

fn default_dc() -> u8 {
    45
}

fn default_pclk_hz() -> u32 {
    80_000_000
}

fn default_spi_mode() -> u8 {
    3
}

impl Default for SpiBusConfig {
    fn default() -> Self {
        Self {
            mosi: default_mosi(),
            sclk: default_sclk(),
            cs: default_cs(),
            dc: default_dc(),
            reset: None,
            pclk_hz: default_pclk_hz(),
            spi_mode: default_spi_mode(),
        }
    }
}

/// Panel configuration for one board.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Controller chip.
    #[serde(default)]
    pub driver: PanelDriver,

    /// Native width; zero means the driver's native resolution.
    #[serde(default)]
    pub width: u16,

    /// Native height; zero means the driver's native resolution.
    #[serde(default)]
    pub height: u16,

    /// Horizontal offset of the visible area.
    #[serde(default)]
    pub offset_x: u16,

    /// Vertical offset of the visible area.
    #[serde(default)]
    pub offset_y: u16,

    /// Invert colors.
    #[serde(default)]
    pub invert_color: bool,

    /// Rotation flags.
    #[serde(default)]
    pub rotation: Rotation,

    /// Bus wiring.
    #[serde(default)]
    pub spi: SpiBusConfig,
}

impl PanelConfig {
    /// Creates a configuration for a driver at its native resolution.
    pub fn for_driver(driver: PanelDriver) -> Self {
        Self {
            driver,
            ..Self::default()
        }
    }

    /// Returns the native dimensions, falling back to the driver's resolution.
    pub fn native_dimensions(&self) -> (u16, u16) {
        let (w, h) = self.driver.native_resolution();
        (
            if self.width == 0 { w } else { self.width },
            if self.height == 0 { h } else { self.height },
        )
    }

    /// Returns the logical dimensions after rotation.
    pub fn logical_dimensions(&self) -> (u16, u16) {
        let (w, h) = self.native_dimensions();
        self.rotation.dimensions(w, h)
    }
}

fn step(name: &'static str, result: Result<()>) -> Result<()> {
    result.map_err(|e| Error::BringUp {
        step: name,
        reason: e.to_string(),
    })
}

/// Runs the panel bring-up sequence.
///
/// Reset, init, rotation, inversion and gap are programmed in that order,
/// the panel is blanked to white row by row, and the output is switched on.
/// Any failing step aborts bring-up.
pub fn bring_up(panel: &mut dyn Panel, config: &PanelConfig) -> Result<()> {
    info!(
        "Install LCD driver {} (SPI mode {}, {} Hz)",
        config.driver, config.spi.spi_mode, config.spi.pclk_hz
    );

    step("reset", panel.reset())?;
    step("init", panel.init())?;
    step("swap_xy", panel.swap_xy(config.rotation.swap_xy))?;
    step(
        "mirror",
        panel.mirror(config.rotation.mirror_x, config.rotation.mirror_y),
    )?;
    step("invert_color", panel.invert_color(config.invert_color))?;
    if config.offset_x != 0 || config.offset_y != 0 {
        step("set_gap", panel.set_gap(config.offset_x, config.offset_y))?;
    }

    let (width, height) = panel.dimensions();
    let row = vec![COLOR_WHITE; width as usize];
    for y in 0..height {
        step("draw_white", panel.draw_bitmap(0, y, width, y + 1, &row))?;
    }
    debug!("Panel blanked ({}x{})", width, height);

    info!("Turning display on");
    step("display_on", panel.display_on(true))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingPanel {
        calls: Vec<&'static str>,
        rows: u16,
        fail_on: Option<&'static str>,
    }

    impl RecordingPanel {
        fn record(&mut self, name: &'static str) -> Result<()> {
            if self.fail_on == Some(name) {
                return Err(Error::PanelNotInitialized);
            }
            if self.calls.last() != Some(&name) {
                self.calls.push(name);
            }
            Ok(())
        }
    }

    impl Panel for RecordingPanel {
        fn reset(&mut self) -> Result<()> {
            self.record("reset")
        }
        fn init(&mut self) -> Result<()> {
            self.record("init")
        }
        fn swap_xy(&mut self, _swap: bool) -> Result<()> {
            self.record("swap_xy")
        }
        fn mirror(&mut self, _mirror_x: bool, _mirror_y: bool) -> Result<()> {
            self.record("mirror")
        }
        fn invert_color(&mut self, _invert: bool) -> Result<()> {
            self.record("invert_color")
        }
        fn set_gap(&mut self, _x: u16, _y: u16) -> Result<()> {
            self.record("set_gap")
        }
        fn draw_bitmap(&mut self, _: u16, _: u16, _: u16, _: u16, pixels: &[u16]) -> Result<()> {
            assert!(pixels.iter().all(|&p| p == COLOR_WHITE));
            self.rows += 1;
            self.record("draw_bitmap")
        }
        fn display_on(&mut self, _on: bool) -> Result<()> {
            self.record("display_on")
        }
        fn dimensions(&self) -> (u16, u16) {
            (8, 4)
        }
    }

    #[test]
    fn test_bring_up_order() {
        let mut panel = RecordingPanel::default();
        let config = PanelConfig::for_driver(PanelDriver::Gc9107);
        bring_up(&mut panel, &config).unwrap();

        assert_eq!(
            panel.calls,
            vec![
                "reset",
                "init",
                "swap_xy",
                "mirror",
                "invert_color",
                "draw_bitmap",
                "display_on"
            ]
        );
        assert_eq!(panel.rows, 4);
    }

    #[test]
    fn test_bring_up_with_gap() {
        let mut panel = RecordingPanel::default();
        let config = PanelConfig {
            offset_x: 2,
            offset_y: 1,
            ..PanelConfig::default()
        };
        bring_up(&mut panel, &config).unwrap();
        assert!(panel.calls.contains(&"set_gap"));
    }

    #[test]
    fn test_bring_up_failure_is_fatal() {
        let mut panel = RecordingPanel {
            fail_on: Some("init"),
            ..RecordingPanel::default()
        };
        let err = bring_up(&mut panel, &PanelConfig::default()).unwrap_err();
        assert!(matches!(err, Error::BringUp { step: "init", .. }));
        assert!(!panel.calls.contains(&"display_on"));
    }

    #[test]
    fn test_native_dimensions() {
        let config = PanelConfig::for_driver(PanelDriver::Gc9107);
        assert_eq!(config.native_dimensions(), (128, 128));

        let config = PanelConfig {
            width: 240,
            height: 135,
            rotation: Rotation::DEG_90,
            ..PanelConfig::default()
        };
        assert_eq!(config.logical_dimensions(), (135, 240));
    }

    #[test]
    fn test_driver_from_str() {
        assert_eq!("GC9107".parse::<PanelDriver>().unwrap(), PanelDriver::Gc9107);
        assert_eq!("st7789".parse::<PanelDriver>().unwrap(), PanelDriver::St7789);
        assert!("ili9341".parse::<PanelDriver>().is_err());
    }
}
