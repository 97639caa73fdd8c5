//! Simulated panel for running the display stack on a host.

use crate::rotation::Rotation;
use crate::{Error, Result, COLOR_BLACK};
use tracing::debug;

use super::color::rgb565_to_rgb888;
use super::driver::{Panel, PanelConfig};

/// Simulated panel. Pixels land in controller RAM, which is laid out
/// row-major in native orientation regardless of the rotation in effect.
pub struct SimPanel {
    native: (u16, u16),
    ram: Vec<u16>,
    rotation: Rotation,
    invert: bool,
    gap: (u16, u16),
    initialized: bool,
    on: bool,
    bitmaps: u64,
}

impl SimPanel {
    /// Creates a simulated panel with the configured native dimensions.
    pub fn new(config: &PanelConfig) -> Self {
        let (width, height) = config.native_dimensions();
        Self {
            native: (width, height),
            ram: vec![COLOR_BLACK; width as usize * height as usize],
            rotation: Rotation::DEG_0,
            invert: false,
            gap: (0, 0),
            initialized: false,
            on: false,
            bitmaps: 0,
        }
    }

    /// Returns controller RAM in native orientation.
    pub fn ram(&self) -> &[u16] {
        &self.ram
    }

    /// Returns the pixel shown at logical coordinates, after rotation.
    pub fn pixel(&self, x: u16, y: u16) -> Option<u16> {
        let (width, height) = self.dimensions();
        if x >= width || y >= height {
            return None;
        }
        Some(self.ram[self.ram_index(x, y)])
    }

    /// Returns the visible image as RGBA8 in logical orientation.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let (width, height) = self.dimensions();
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                let (r, g, b) = rgb565_to_rgb888(self.ram[self.ram_index(x, y)]);
                rgba.extend_from_slice(&[r, g, b, 255]);
            }
        }
        rgba
    }

    /// Returns true if the display output is on.
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Returns the configured gap.
    pub fn gap(&self) -> (u16, u16) {
        self.gap
    }

    /// Returns the number of bitmap writes since creation.
    pub fn bitmap_count(&self) -> u64 {
        self.bitmaps
    }

    fn ram_index(&self, x: u16, y: u16) -> usize {
        let (native_w, native_h) = self.native;
        let (nx, ny) = self.rotation.to_native(x, y, native_w, native_h);
        ny as usize * native_w as usize + nx as usize
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::PanelNotInitialized)
        }
    }
}

impl Panel for SimPanel {
    fn reset(&mut self) -> Result<()> {
        self.initialized = false;
        self.on = false;
        self.ram.fill(COLOR_BLACK);
        Ok(())
    }

    fn init(&mut self) -> Result<()> {
        self.initialized = true;
        debug!(
            "Simulated panel initialized ({}x{})",
            self.native.0, self.native.1
        );
        Ok(())
    }

    fn swap_xy(&mut self, swap: bool) -> Result<()> {
        self.ensure_initialized()?;
        self.rotation.swap_xy = swap;
        Ok(())
    }

    fn mirror(&mut self, mirror_x: bool, mirror_y: bool) -> Result<()> {
        self.ensure_initialized()?;
        self.rotation.mirror_x = mirror_x;
        self.rotation.mirror_y = mirror_y;
        Ok(())
    }

    fn invert_color(&mut self, invert: bool) -> Result<()> {
        self.ensure_initialized()?;
        self.invert = invert;
        Ok(())
    }

    fn set_gap(&mut self, x: u16, y: u16) -> Result<()> {
        self.ensure_initialized()?;
        self.gap = (x, y);
        Ok(())
    }

    fn draw_bitmap(
        &mut self,
        x_start: u16,
        y_start: u16,
        x_end: u16,
        y_end: u16,
        pixels: &[u16],
    ) -> Result<()> {
        self.ensure_initialized()?;

        let (width, height) = self.dimensions();
        if x_start >= x_end || y_start >= y_end || x_end > width || y_end > height {
            return Err(Error::BitmapOutOfBounds {
                x_start,
                y_start,
                x_end,
                y_end,
                width,
                height,
            });
        }

        let region_width = (x_end - x_start) as usize;
        let expected = region_width * (y_end - y_start) as usize;
        if pixels.len() != expected {
            return Err(Error::PixelCount {
                expected,
                actual: pixels.len(),
            });
        }

        for (i, &pixel) in pixels.iter().enumerate() {
            let x = x_start + (i % region_width) as u16;
            let y = y_start + (i / region_width) as u16;
            let index = self.ram_index(x, y);
            self.ram[index] = if self.invert { !pixel } else { pixel };
        }

        self.bitmaps += 1;
        Ok(())
    }

    fn display_on(&mut self, on: bool) -> Result<()> {
        self.ensure_initialized()?;
        self.on = on;
        debug!("Simulated panel output {}", if on { "on" } else { "off" });
        Ok(())
    }

    fn dimensions(&self) -> (u16, u16) {
        self.rotation.dimensions(self.native.0, self.native.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{bring_up, PanelDriver};
    use crate::COLOR_WHITE;

    #[test]
    fn test_requires_init() {
        let mut panel = SimPanel::new(&PanelConfig::for_driver(PanelDriver::Gc9107));
        assert!(matches!(
            panel.draw_bitmap(0, 0, 1, 1, &[0]),
            Err(Error::PanelNotInitialized)
        ));
    }

    #[test]
    fn test_bring_up_blanks_white() {
        let config = PanelConfig::for_driver(PanelDriver::Gc9107);
        let mut panel = SimPanel::new(&config);
        bring_up(&mut panel, &config).unwrap();

        assert!(panel.is_on());
        assert!(panel.ram().iter().all(|&p| p == COLOR_WHITE));
        assert_eq!(panel.bitmap_count(), 128);
    }

    #[test]
    fn test_rotated_draw() {
        let config = PanelConfig {
            width: 4,
            height: 2,
            rotation: Rotation::DEG_180,
            ..PanelConfig::default()
        };
        let mut panel = SimPanel::new(&config);
        bring_up(&mut panel, &config).unwrap();

        panel.draw_bitmap(0, 0, 1, 1, &[0xF800]).unwrap();
        assert_eq!(panel.ram()[4 + 3], 0xF800);
        assert_eq!(panel.pixel(0, 0), Some(0xF800));
        assert_eq!(panel.pixel(4, 0), None);
        assert_eq!(&panel.to_rgba8()[..4], &[0xFF, 0, 0, 0xFF]);
        assert_eq!(&panel.to_rgba8()[28..], &[0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_out_of_bounds() {
        let config = PanelConfig::for_driver(PanelDriver::Gc9107);
        let mut panel = SimPanel::new(&config);
        bring_up(&mut panel, &config).unwrap();

        assert!(panel.draw_bitmap(0, 0, 129, 1, &[0; 129]).is_err());
        assert!(panel.draw_bitmap(0, 0, 2, 2, &[0; 3]).is_err());
    }
}
