//! Canvas for rasterizing the scene before it is pushed to the panel.

use anyhow::{Context, Result};
use chatface_hw::panel::rgb888_to_rgb565;
use chatface_hw::Panel;
use tiny_skia::{
    Color, FillRule, LineCap, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform,
};

/// Drawing area in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Area {
    /// Returns the point at fractional coordinates inside the area.
    pub fn at(&self, fx: f32, fy: f32) -> (f32, f32) {
        (self.x + self.width * fx, self.y + self.height * fy)
    }

    /// Returns the shorter side.
    pub fn min_side(&self) -> f32 {
        self.width.min(self.height)
    }
}

/// Converts a 0xRRGGBB value to a paint color.
fn color(rgb: u32) -> Color {
    Color::from_rgba8(
        ((rgb >> 16) & 0xFF) as u8,
        ((rgb >> 8) & 0xFF) as u8,
        (rgb & 0xFF) as u8,
        0xFF,
    )
}

fn paint(rgb: u32) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color(rgb));
    paint.anti_alias = true;
    paint
}

/// Canvas for rendering.
pub struct Canvas {
    width: u32,
    height: u32,
    pixmap: Pixmap,
}

impl Canvas {
    /// Creates a new canvas.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height)
            .with_context(|| format!("Failed to create {}x{} pixmap", width, height))?;
        Ok(Self {
            width,
            height,
            pixmap,
        })
    }

    /// Returns the canvas dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the whole canvas as an area.
    pub fn area(&self) -> Area {
        Area {
            x: 0.0,
            y: 0.0,
            width: self.width as f32,
            height: self.height as f32,
        }
    }

    /// Clears the canvas to a color.
    pub fn clear(&mut self, rgb: u32) {
        self.pixmap.fill(color(rgb));
    }

    /// Draws a filled rectangle.
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, rgb: u32) {
        if let Some(rect) = Rect::from_xywh(x, y, width, height) {
            self.pixmap
                .fill_rect(rect, &paint(rgb), Transform::identity(), None);
        }
    }

    /// Draws a filled circle.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, rgb: u32) {
        if let Some(path) = PathBuilder::from_circle(cx, cy, radius) {
            self.pixmap.fill_path(
                &path,
                &paint(rgb),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    /// Draws a filled ellipse inside a bounding box.
    pub fn fill_oval(&mut self, x: f32, y: f32, width: f32, height: f32, rgb: u32) {
        let Some(rect) = Rect::from_xywh(x, y, width, height) else {
            return;
        };
        if let Some(path) = PathBuilder::from_oval(rect) {
            self.pixmap.fill_path(
                &path,
                &paint(rgb),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    /// Strokes a straight line.
    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, rgb: u32) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        self.stroke(pb.finish(), width, rgb);
    }

    /// Strokes a quadratic curve through a control point.
    pub fn curve(
        &mut self,
        from: (f32, f32),
        control: (f32, f32),
        to: (f32, f32),
        width: f32,
        rgb: u32,
    ) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.quad_to(control.0, control.1, to.0, to.1);
        self.stroke(pb.finish(), width, rgb);
    }

    /// Draws a rectangle outline.
    pub fn rect_outline(&mut self, area: Area, width: f32, rgb: u32) {
        let Some(rect) = Rect::from_xywh(area.x, area.y, area.width, area.height) else {
            return;
        };
        self.stroke(Some(PathBuilder::from_rect(rect)), width, rgb);
    }

    fn stroke(&mut self, path: Option<Path>, width: f32, rgb: u32) {
        if let Some(path) = path {
            let stroke = Stroke {
                width,
                line_cap: LineCap::Round,
                ..Stroke::default()
            };
            self.pixmap
                .stroke_path(&path, &paint(rgb), &stroke, Transform::identity(), None);
        }
    }

    /// Converts the canvas to RGB565 and writes it to the panel in one
    /// bitmap.
    pub fn render_to_panel(&self, panel: &mut dyn Panel) -> Result<()> {
        let (width, height) = panel.dimensions();
        if (width as u32, height as u32) != self.dimensions() {
            anyhow::bail!(
                "Canvas is {}x{} but panel is {}x{}",
                self.width,
                self.height,
                width,
                height
            );
        }

        let pixels: Vec<u16> = self
            .pixmap
            .pixels()
            .iter()
            .map(|p| rgb888_to_rgb565(p.red(), p.green(), p.blue()))
            .collect();
        panel
            .draw_bitmap(0, 0, width, height, &pixels)
            .context("Failed to draw frame")?;
        Ok(())
    }

    /// Returns the RGB values of one pixel.
    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        self.pixmap
            .pixel(x, y)
            .map(|p| (p.red(), p.green(), p.blue()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatface_hw::{bring_up, PanelConfig, PanelDriver, SimPanel};

    #[test]
    fn test_canvas_creation() {
        let canvas = Canvas::new(240, 240).unwrap();
        assert_eq!(canvas.dimensions(), (240, 240));
        assert!(Canvas::new(0, 10).is_err());
    }

    #[test]
    fn test_fill_rect() {
        let mut canvas = Canvas::new(16, 16).unwrap();
        canvas.clear(0x000000);
        canvas.fill_rect(4.0, 4.0, 8.0, 8.0, 0xFF0000);
        assert_eq!(canvas.pixel(8, 8), Some((0xFF, 0, 0)));
        assert_eq!(canvas.pixel(0, 0), Some((0, 0, 0)));
    }

    #[test]
    fn test_render_to_panel() {
        let config = PanelConfig::for_driver(PanelDriver::Gc9107);
        let mut panel = SimPanel::new(&config);
        bring_up(&mut panel, &config).unwrap();

        let mut canvas = Canvas::new(128, 128).unwrap();
        canvas.clear(0x000000);
        canvas.render_to_panel(&mut panel).unwrap();
        assert!(panel.ram().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_render_size_mismatch() {
        let config = PanelConfig::for_driver(PanelDriver::Gc9107);
        let mut panel = SimPanel::new(&config);
        bring_up(&mut panel, &config).unwrap();

        let canvas = Canvas::new(240, 240).unwrap();
        assert!(canvas.render_to_panel(&mut panel).is_err());
    }
}
