//! Traits for the output peripherals the monitor drives.
//!
//! The drivers behind these traits (WS2812 chain, SSD1306 display, PWM
//! buzzers) live in the firmware crate. The core only needs the handful of
//! primitives listed here.

use crate::render::{Frame, Rgb};

/// Addressable LED matrix fed one colour per cell.
pub trait LedMatrix {
    /// Error type for transmit operations.
    type Error;

    /// Push the colour of the next cell in chain order.
    fn push(&mut self, color: Rgb) -> Result<(), Self::Error>;

    /// Push a full frame, cell 0 first.
    fn write_frame(&mut self, frame: &Frame) -> Result<(), Self::Error> {
        for &color in frame.cells() {
            self.push(color)?;
        }
        Ok(())
    }
}

/// Buffered monochrome display. Nothing reaches the panel until
/// [`flush`](Self::flush).
pub trait MonoDisplay {
    /// Error type for bus operations.
    type Error;

    /// Set every pixel to `on`.
    fn fill(&mut self, on: bool) -> Result<(), Self::Error>;

    /// Draw a rectangle outline (or a filled one when `filled`).
    fn draw_rect(
        &mut self,
        x: u8,
        y: u8,
        width: u8,
        height: u8,
        on: bool,
        filled: bool,
    ) -> Result<(), Self::Error>;

    /// Draw `text` with its top-left corner at `(x, y)`.
    fn draw_string(&mut self, text: &str, x: u8, y: u8) -> Result<(), Self::Error>;

    /// Send the buffer to the panel.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Audible alert output.
pub trait ToneOutput {
    /// Error type for control operations.
    type Error;

    /// Start the tone.
    fn tone_on(&mut self) -> Result<(), Self::Error>;

    /// Silence the tone.
    fn tone_off(&mut self) -> Result<(), Self::Error>;
}
