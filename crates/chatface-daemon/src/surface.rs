//! Scene surface on top of the simulated panel.
//!
//! Holds the scene objects the display core binds frames into and
//! rasterizes them to the panel when [`SceneSurface::flush`] runs.

use anyhow::{Context, Result};
use chatface_core::{DisplaySurface, ImageHandle};
use chatface_hw::{Panel, SimPanel};
use tracing::{debug, warn};

use crate::rendering::{encode_png, Area, Canvas, Sprite};

const BACKGROUND: u32 = 0x000000;
const STATUS_BAR: u32 = 0x202020;
const STATUS_ICON: u32 = 0x9E9E9E;

/// Fraction of the screen height used by the status bar.
const STATUS_BAR_HEIGHT: f32 = 0.14;

/// Face image object inside the content container.
#[derive(Debug, Default)]
struct FaceObject {
    image: Option<ImageHandle>,
}

pub struct SceneSurface {
    panel: Option<SimPanel>,
    canvas: Canvas,
    logo: Option<ImageHandle>,
    face: Option<FaceObject>,
    containers: bool,
    status_hidden: bool,
    dirty: bool,
    frames_flushed: u64,
}

impl SceneSurface {
    /// Creates a surface drawing on an already brought-up panel.
    pub fn new(panel: SimPanel) -> Result<Self> {
        let (width, height) = panel.dimensions();
        let canvas = Canvas::new(width as u32, height as u32).context("Failed to create canvas")?;
        Ok(Self {
            panel: Some(panel),
            canvas,
            logo: None,
            face: None,
            containers: false,
            status_hidden: false,
            dirty: true,
            frames_flushed: 0,
        })
    }

    /// Returns the image currently bound into the face object.
    pub fn face_image(&self) -> Option<&ImageHandle> {
        self.face.as_ref().and_then(|face| face.image.as_ref())
    }

    /// Returns the image currently bound into the logo object.
    pub fn logo_image(&self) -> Option<&ImageHandle> {
        self.logo.as_ref()
    }

    /// Returns true while the panel output is on.
    pub fn panel_on(&self) -> bool {
        self.panel.as_ref().is_some_and(|panel| panel.is_on())
    }

    /// Number of frames pushed to the panel.
    pub fn frames_flushed(&self) -> u64 {
        self.frames_flushed
    }

    /// Switches the panel output off.
    pub fn panel_off(&mut self) -> Result<()> {
        if let Some(panel) = self.panel.as_mut() {
            panel.display_on(false).context("Failed to switch panel off")?;
        }
        Ok(())
    }

    /// Switches the panel output back on and schedules a redraw.
    pub fn panel_resume(&mut self) -> Result<()> {
        if let Some(panel) = self.panel.as_mut() {
            panel.display_on(true).context("Failed to switch panel on")?;
            self.dirty = true;
        }
        Ok(())
    }

    /// Rasterizes the scene to the panel if anything changed.
    ///
    /// Returns true when a frame was pushed.
    pub fn flush(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        let Some(panel) = self.panel.as_mut() else {
            return Ok(false);
        };
        if !panel.is_on() {
            return Ok(false);
        }

        let canvas = &mut self.canvas;
        canvas.clear(BACKGROUND);
        let screen = canvas.area();

        if let Some(logo) = &self.logo {
            Sprite::parse(logo).draw(canvas, screen);
        } else if self.containers {
            let bar_h = (screen.height * STATUS_BAR_HEIGHT).round();
            if !self.status_hidden {
                draw_status_bar(canvas, screen, bar_h);
            }
            let content = Area {
                x: 0.0,
                y: bar_h,
                width: screen.width,
                height: screen.height - bar_h,
            };
            if let Some(image) = self.face.as_ref().and_then(|face| face.image.as_ref()) {
                Sprite::parse(image).draw(canvas, content);
            }
        }

        canvas.render_to_panel(panel)?;
        self.dirty = false;
        self.frames_flushed += 1;
        Ok(true)
    }

    /// Encodes what the panel shows as PNG.
    pub fn screenshot_png(&self) -> Result<Vec<u8>> {
        let panel = self.panel.as_ref().context("Panel released")?;
        let (width, height) = panel.dimensions();
        encode_png(width as u32, height as u32, &panel.to_rgba8())
    }
}

/// Status bar with a network and a battery glyph.
fn draw_status_bar(canvas: &mut Canvas, screen: Area, bar_h: f32) {
    canvas.fill_rect(0.0, 0.0, screen.width, bar_h, STATUS_BAR);

    let unit = bar_h / 6.0;
    for i in 0..3 {
        let h = unit * (i + 2) as f32;
        canvas.fill_rect(unit * (1.5 + 1.5 * i as f32), bar_h - unit - h, unit, h, STATUS_ICON);
    }

    let battery = Area {
        x: screen.width - unit * 9.0,
        y: unit * 1.5,
        width: unit * 7.0,
        height: unit * 3.0,
    };
    canvas.rect_outline(battery, 1.0, STATUS_ICON);
    canvas.fill_rect(
        battery.x + unit * 0.5,
        battery.y + unit * 0.5,
        unit * 4.0,
        unit * 2.0,
        STATUS_ICON,
    );
}

impl DisplaySurface for SceneSurface {
    fn show_logo(&mut self, frame: &ImageHandle) -> chatface_core::Result<()> {
        if self.panel.is_none() {
            return Err(chatface_core::Error::Surface(
                "cannot create logo without a panel".into(),
            ));
        }
        self.logo = Some(frame.clone());
        self.dirty = true;
        Ok(())
    }

    fn set_logo_image(&mut self, frame: &ImageHandle) -> bool {
        match self.logo.as_mut() {
            Some(logo) => {
                *logo = frame.clone();
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    fn delete_logo(&mut self) {
        if self.logo.take().is_some() {
            self.dirty = true;
        }
    }

    fn setup_ui(&mut self, initial_face: Option<&ImageHandle>) -> chatface_core::Result<()> {
        if self.panel.is_none() {
            return Err(chatface_core::Error::Surface(
                "cannot build UI without a panel".into(),
            ));
        }
        self.containers = true;
        self.face = Some(FaceObject {
            image: initial_face.cloned(),
        });
        self.dirty = true;
        debug!("Scene UI created");
        Ok(())
    }

    fn set_face_image(&mut self, frame: &ImageHandle) -> bool {
        match self.face.as_mut() {
            Some(face) => {
                face.image = Some(frame.clone());
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    fn status_hidden(&self) -> bool {
        self.status_hidden
    }

    fn set_status_hidden(&mut self, hidden: bool) {
        if self.status_hidden != hidden {
            self.status_hidden = hidden;
            self.dirty = true;
        }
    }

    fn release_content(&mut self) {
        self.logo = None;
        self.face = None;
    }

    fn release_containers(&mut self) {
        self.containers = false;
    }

    fn release_display(&mut self) {
        if let Some(mut panel) = self.panel.take() {
            if let Err(e) = panel.display_on(false) {
                warn!("Failed to switch panel off: {}", e);
            }
            debug!("Panel released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatface_hw::{bring_up, PanelConfig, PanelDriver};

    fn surface() -> SceneSurface {
        let config = PanelConfig::for_driver(PanelDriver::Gc9107);
        let mut panel = SimPanel::new(&config);
        bring_up(&mut panel, &config).unwrap();
        SceneSurface::new(panel).unwrap()
    }

    fn handle(name: &str) -> ImageHandle {
        ImageHandle::new(name)
    }

    #[test]
    fn test_binds_need_objects() {
        let mut surface = surface();
        assert!(!surface.set_logo_image(&handle("bootlogo2")));
        assert!(!surface.set_face_image(&handle("happy1")));

        surface.show_logo(&handle("bootlogo1")).unwrap();
        assert!(surface.set_logo_image(&handle("bootlogo2")));
        assert_eq!(surface.logo_image(), Some(&handle("bootlogo2")));

        surface.delete_logo();
        surface.setup_ui(Some(&handle("neutral1"))).unwrap();
        assert_eq!(surface.face_image(), Some(&handle("neutral1")));
        assert!(surface.set_face_image(&handle("happy1")));
        assert_eq!(surface.face_image(), Some(&handle("happy1")));
    }

    #[test]
    fn test_flush_only_when_dirty() {
        let mut surface = surface();
        surface.show_logo(&handle("bootlogo1")).unwrap();
        assert!(surface.flush().unwrap());
        assert!(!surface.flush().unwrap());

        surface.set_logo_image(&handle("bootlogo2"));
        assert!(surface.flush().unwrap());
        assert_eq!(surface.frames_flushed(), 2);
    }

    #[test]
    fn test_status_bar_drawn_unless_hidden() {
        let mut surface = surface();
        surface.setup_ui(None).unwrap();
        surface.flush().unwrap();
        let shown = surface.panel.as_ref().unwrap().pixel(0, 0);
        assert_ne!(shown, Some(0));

        surface.set_status_hidden(true);
        surface.flush().unwrap();
        let hidden = surface.panel.as_ref().unwrap().pixel(0, 0);
        assert_eq!(hidden, Some(0));
    }

    #[test]
    fn test_panel_off_stops_flushing() {
        let mut surface = surface();
        surface.setup_ui(None).unwrap();
        surface.panel_off().unwrap();
        assert!(!surface.panel_on());
        assert!(!surface.flush().unwrap());

        surface.panel_resume().unwrap();
        assert!(surface.flush().unwrap());
    }

    #[test]
    fn test_release_order_is_safe() {
        let mut surface = surface();
        surface.setup_ui(None).unwrap();
        surface.release_content();
        surface.release_containers();
        surface.release_display();
        surface.release_display();

        assert!(!surface.set_face_image(&handle("happy1")));
        assert!(!surface.flush().unwrap());
        assert!(surface.screenshot_png().is_err());
        assert!(surface.show_logo(&handle("bootlogo1")).is_err());
    }

    #[test]
    fn test_screenshot_is_png() {
        let mut surface = surface();
        surface.show_logo(&handle("bootlogo1")).unwrap();
        surface.flush().unwrap();
        let png = surface.screenshot_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}
