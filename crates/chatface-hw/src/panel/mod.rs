//! LCD panel module.
//!
//! Panel operations as exposed by the vendor LCD driver, the bring-up
//! sequence run once at boot, and a simulated panel backed by controller RAM.

mod driver;
mod sim;

pub mod color;

pub use color::{rgb565_to_rgb888, rgb888_to_rgb565};
pub use driver::{bring_up, Panel, PanelConfig, PanelDriver, SpiBusConfig};
pub use sim::SimPanel;
