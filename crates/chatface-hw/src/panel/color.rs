//! RGB565 pixel packing as sent over the panel bus.

/// Packs an 8-bit-per-channel color into RGB565.
pub fn rgb888_to_rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
}

/// Unpacks RGB565, replicating the top bits of each channel into the
/// bottom bits so that full scale maps to 255.
pub fn rgb565_to_rgb888(pixel: u16) -> (u8, u8, u8) {
    let r = (pixel >> 11) as u8 & 0x1F;
    let g = (pixel >> 5) as u8 & 0x3F;
    let b = pixel as u8 & 0x1F;
    ((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
}
