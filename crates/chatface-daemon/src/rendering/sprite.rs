//! Procedural sprites standing in for the prepared image assets.
//!
//! Image handles follow the `<name><frame>` convention of the built-in
//! tables ("happy3", "bootlogo12"). The name picks the drawing, the frame
//! number drives blinking and motion.

use chatface_core::ImageHandle;

use super::canvas::{Area, Canvas};

const WHITE: u32 = 0xFFFFFF;
const PINK: u32 = 0xFF6FA8;
const BLUE: u32 = 0x4FA3FF;
const RED: u32 = 0xE53935;
const DIM: u32 = 0x303030;
const ACCENT: u32 = 0x00BFA5;
const MISSING: u32 = 0xFF00FF;

/// Facial expression drawn for a face sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expression {
    Neutral,
    Happy,
    Sad,
    Angry,
    Loving,
    Embarrassed,
}

/// A drawable image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sprite {
    Logo { frame: u32 },
    Face { expression: Expression, frame: u32 },
    /// Handle with no known drawing.
    Unknown,
}

impl Sprite {
    /// Parses an image handle.
    pub fn parse(handle: &ImageHandle) -> Self {
        let name = handle.as_str();
        let prefix = name.trim_end_matches(|c: char| c.is_ascii_digit());
        let frame = name[prefix.len()..].parse().unwrap_or(1);

        let expression = match prefix {
            "bootlogo" => return Sprite::Logo { frame },
            "neutral" | "default" => Expression::Neutral,
            "happy" => Expression::Happy,
            "sad" => Expression::Sad,
            "angry" => Expression::Angry,
            "loving" => Expression::Loving,
            "embarrassed" => Expression::Embarrassed,
            _ => return Sprite::Unknown,
        };
        Sprite::Face { expression, frame }
    }

    /// Draws the sprite into an area.
    pub fn draw(&self, canvas: &mut Canvas, area: Area) {
        match *self {
            Sprite::Logo { frame } => draw_logo(canvas, area, frame),
            Sprite::Face { expression, frame } => draw_face(canvas, area, expression, frame),
            Sprite::Unknown => {
                canvas.rect_outline(area, 2.0, MISSING);
                canvas.line(area.at(0.0, 0.0), area.at(1.0, 1.0), 2.0, MISSING);
                canvas.line(area.at(1.0, 0.0), area.at(0.0, 1.0), 2.0, MISSING);
            }
        }
    }
}

/// Spinner of twelve dots and a progress bar.
fn draw_logo(canvas: &mut Canvas, area: Area, frame: u32) {
    let (cx, cy) = area.at(0.5, 0.45);
    let radius = area.min_side() * 0.28;
    let dot = area.min_side() * 0.035;
    let lit = frame % 12;

    for i in 0..12u32 {
        let angle = i as f32 * std::f32::consts::TAU / 12.0;
        let (x, y) = (cx + radius * angle.sin(), cy - radius * angle.cos());
        let color = if i == lit { ACCENT } else { DIM };
        canvas.fill_circle(x, y, dot, color);
    }

    let progress = (frame as f32 / 22.0).min(1.0);
    let (bx, by) = area.at(0.2, 0.85);
    let bar_w = area.width * 0.6;
    let bar_h = area.height * 0.03;
    canvas.fill_rect(bx, by, bar_w, bar_h, DIM);
    canvas.fill_rect(bx, by, bar_w * progress, bar_h, ACCENT);
}

fn draw_face(canvas: &mut Canvas, area: Area, expression: Expression, frame: u32) {
    let side = area.min_side();
    let bob = (frame as f32 * 0.8).sin() * side * 0.015;
    let blink = frame % 7 == 0 && expression != Expression::Loving;

    let eye_w = side * 0.14;
    let eye_h = match (blink, expression) {
        (true, _) => side * 0.03,
        (false, Expression::Embarrassed) => side * 0.08,
        (false, Expression::Happy) => side * 0.12,
        _ => side * 0.2,
    };

    for fx in [0.32, 0.68] {
        let (ex, ey) = area.at(fx, 0.42);
        let ey = ey + bob;
        if expression == Expression::Loving {
            // Two lobes and a point.
            let r = eye_w * 0.3;
            canvas.fill_circle(ex - r, ey - r * 0.5, r, PINK);
            canvas.fill_circle(ex + r, ey - r * 0.5, r, PINK);
            canvas.curve(
                (ex - r * 1.9, ey),
                (ex, ey + r * 2.5),
                (ex + r * 1.9, ey),
                r,
                PINK,
            );
        } else {
            canvas.fill_oval(ex - eye_w / 2.0, ey - eye_h / 2.0, eye_w, eye_h, WHITE);
        }
    }

    let stroke = side * 0.03;
    match expression {
        Expression::Neutral => {
            canvas.line(area.at(0.42, 0.72), area.at(0.58, 0.72), stroke, WHITE);
        }
        Expression::Happy | Expression::Loving => {
            let (cx, cy) = area.at(0.5, 0.82);
            canvas.curve(
                area.at(0.36, 0.68),
                (cx, cy + bob),
                area.at(0.64, 0.68),
                stroke,
                WHITE,
            );
        }
        Expression::Sad => {
            canvas.curve(
                area.at(0.38, 0.78),
                area.at(0.5, 0.66),
                area.at(0.62, 0.78),
                stroke,
                WHITE,
            );
            let fall = (frame % 8) as f32 / 8.0;
            let (tx, ty) = area.at(0.3, 0.55 + fall * 0.2);
            canvas.fill_circle(tx, ty, side * 0.025, BLUE);
        }
        Expression::Angry => {
            canvas.line(area.at(0.22, 0.26), area.at(0.42, 0.34), stroke, RED);
            canvas.line(area.at(0.78, 0.26), area.at(0.58, 0.34), stroke, RED);
            canvas.curve(
                area.at(0.4, 0.76),
                area.at(0.5, 0.7),
                area.at(0.6, 0.76),
                stroke,
                WHITE,
            );
        }
        Expression::Embarrassed => {
            for fx in [0.22, 0.78] {
                let (x, y) = area.at(fx, 0.58);
                canvas.fill_oval(x - side * 0.06, y, side * 0.12, side * 0.05, PINK);
            }
            let (mx, my) = area.at(0.5, 0.72);
            canvas.fill_circle(mx, my + bob, side * 0.03, WHITE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprite(name: &str) -> Sprite {
        Sprite::parse(&ImageHandle::new(name))
    }

    #[test]
    fn test_parse() {
        assert_eq!(sprite("bootlogo12"), Sprite::Logo { frame: 12 });
        assert_eq!(
            sprite("happy3"),
            Sprite::Face {
                expression: Expression::Happy,
                frame: 3
            }
        );
        assert_eq!(
            sprite("default14"),
            Sprite::Face {
                expression: Expression::Neutral,
                frame: 14
            }
        );
        assert_eq!(
            sprite("sad"),
            Sprite::Face {
                expression: Expression::Sad,
                frame: 1
            }
        );
        assert_eq!(sprite("qr_code"), Sprite::Unknown);
        assert_eq!(sprite(""), Sprite::Unknown);
    }

    #[test]
    fn test_face_draws_eyes() {
        let mut canvas = Canvas::new(128, 128).unwrap();
        canvas.clear(0x000000);
        let area = canvas.area();
        sprite("neutral2").draw(&mut canvas, area);

        // Eye centers, with the frame 2 bob of under two pixels.
        let (x, y) = area.at(0.32, 0.42);
        let (r, g, b) = canvas.pixel(x as u32, y as u32).unwrap();
        assert!(r > 200 && g > 200 && b > 200);
        assert_eq!(canvas.pixel(2, 2), Some((0, 0, 0)));
    }

    #[test]
    fn test_unknown_draws_marker() {
        let mut canvas = Canvas::new(64, 64).unwrap();
        canvas.clear(0x000000);
        let area = canvas.area();
        sprite("mystery").draw(&mut canvas, area);
        let (r, _, b) = canvas.pixel(32, 32).unwrap();
        assert!(r > 128 && b > 128);
    }
}
