//! Panel rotation support.
//!
//! The panel controller rotates in hardware through three flags: swapping the
//! X/Y axes and mirroring either axis. The four right-angle rotations are
//! presets over those flags.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Axis swap and mirror flags programmed into the panel controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rotation {
    /// Exchange the X and Y axes.
    #[serde(default)]
    pub swap_xy: bool,
    /// Mirror along the X axis.
    #[serde(default)]
    pub mirror_x: bool,
    /// Mirror along the Y axis.
    #[serde(default)]
    pub mirror_y: bool,
}

impl Rotation {
    /// No rotation.
    pub const DEG_0: Rotation = Rotation {
        swap_xy: false,
        mirror_x: false,
        mirror_y: false,
    };
    /// Quarter turn clockwise.
    pub const DEG_90: Rotation = Rotation {
        swap_xy: true,
        mirror_x: true,
        mirror_y: false,
    };
    /// Half turn.
    pub const DEG_180: Rotation = Rotation {
        swap_xy: false,
        mirror_x: true,
        mirror_y: true,
    };
    /// Quarter turn counter-clockwise.
    pub const DEG_270: Rotation = Rotation {
        swap_xy: true,
        mirror_x: false,
        mirror_y: true,
    };

    /// Returns the logical dimensions for a panel with the given native size.
    pub fn dimensions(&self, width: u16, height: u16) -> (u16, u16) {
        if self.swap_xy {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Maps a logical pixel position to its native panel position.
    ///
    /// `width` and `height` are the native panel dimensions.
    pub fn to_native(&self, x: u16, y: u16, width: u16, height: u16) -> (u16, u16) {
        let (mut nx, mut ny) = if self.swap_xy { (y, x) } else { (x, y) };
        if self.mirror_x {
            nx = width - 1 - nx;
        }
        if self.mirror_y {
            ny = height - 1 - ny;
        }
        (nx, ny)
    }

    fn degrees(&self) -> Option<u16> {
        match *self {
            Rotation::DEG_0 => Some(0),
            Rotation::DEG_90 => Some(90),
            Rotation::DEG_180 => Some(180),
            Rotation::DEG_270 => Some(270),
            _ => None,
        }
    }
}

impl FromStr for Rotation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "0" => Ok(Rotation::DEG_0),
            "90" => Ok(Rotation::DEG_90),
            "180" => Ok(Rotation::DEG_180),
            "270" => Ok(Rotation::DEG_270),
            _ => Err(Error::InvalidRotation(s.to_string())),
        }
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.degrees() {
            Some(deg) => write!(f, "{}", deg),
            None => write!(
                f,
                "swap_xy={} mirror_x={} mirror_y={}",
                self.swap_xy, self.mirror_x, self.mirror_y
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        assert_eq!(Rotation::DEG_0.dimensions(240, 135), (240, 135));
        assert_eq!(Rotation::DEG_90.dimensions(240, 135), (135, 240));
        assert_eq!(Rotation::DEG_180.dimensions(240, 135), (240, 135));
    }

    #[test]
    fn test_to_native() {
        // 4x2 native panel
        assert_eq!(Rotation::DEG_0.to_native(1, 1, 4, 2), (1, 1));
        assert_eq!(Rotation::DEG_180.to_native(0, 0, 4, 2), (3, 1));
        // Logical 2x4 after swap: (1, 3) -> swapped (3, 1) -> mirror x -> (0, 1)
        assert_eq!(Rotation::DEG_90.to_native(1, 3, 4, 2), (0, 1));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("0".parse::<Rotation>().unwrap(), Rotation::DEG_0);
        assert_eq!("180".parse::<Rotation>().unwrap(), Rotation::DEG_180);
        assert!("45".parse::<Rotation>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Rotation::DEG_270.to_string(), "270");
        let custom = Rotation {
            swap_xy: false,
            mirror_x: true,
            mirror_y: false,
        };
        assert_eq!(custom.to_string(), "swap_xy=false mirror_x=true mirror_y=false");
    }
}
