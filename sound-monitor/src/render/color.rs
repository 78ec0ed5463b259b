//! 24-bit cell colours and the level palette.

use crate::classifier::Level;

/// One addressable LED colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Pack as the WS2812 PIO FIFO word: `G << 24 | R << 16 | B << 8`.
    pub const fn to_grb_word(self) -> u32 {
        ((self.g as u32) << 24) | ((self.r as u32) << 16) | ((self.b as u32) << 8)
    }

    pub const fn is_off(self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }
}

/// Colour of the lit cells in a column showing `level`.
pub const fn level_color(level: Level) -> Rgb {
    match level.get() {
        1 => Rgb::new(0, 255, 0),
        2 => Rgb::new(127, 191, 0),
        3 => Rgb::new(255, 255, 0),
        4 => Rgb::new(255, 127, 0),
        5 => Rgb::new(255, 0, 0),
        _ => Rgb::OFF,
    }
}
