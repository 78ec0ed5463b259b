//! Fixed screens on the monochrome display.
//!
//! These helpers only draw into the display's buffer. The caller decides
//! when to [`flush`](crate::control::MonoDisplay::flush).

use crate::constants::{DISPLAY_WIDTH, FONT_WIDTH};
use crate::control::MonoDisplay;

/// Frame drawn around the idle screen and blinked during an alert.
pub const BORDER: (u8, u8, u8, u8) = (3, 3, 122, 60);

pub const IDLE_LINES: [(&str, u8); 2] = [("MONITORING", 20), ("SOUNDS", 35)];

pub const ALERT_TEXT: &str = "SILENCE";

pub const ALERT_ROW: u8 = 31;

/// Left edge that centres `text` horizontally.
pub const fn centered_x(text: &str) -> u8 {
    let width = text.len() * FONT_WIDTH as usize;
    let half = (DISPLAY_WIDTH / 2) as usize;
    let x = half.saturating_sub(width / 2);
    x as u8
}

/// Draw the border rectangle in `on` colour.
pub fn draw_border<D: MonoDisplay>(display: &mut D, on: bool) -> Result<(), D::Error> {
    let (x, y, w, h) = BORDER;
    display.draw_rect(x, y, w, h, on, false)
}

/// Normal monitoring screen: bordered two-line caption.
pub fn draw_idle<D: MonoDisplay>(display: &mut D) -> Result<(), D::Error> {
    display.fill(false)?;
    draw_border(display, true)?;
    for (text, y) in IDLE_LINES {
        display.draw_string(text, centered_x(text), y)?;
    }
    Ok(())
}

/// Alert message without the border.
pub fn draw_alert<D: MonoDisplay>(display: &mut D) -> Result<(), D::Error> {
    display.fill(false)?;
    display.draw_string(ALERT_TEXT, centered_x(ALERT_TEXT), ALERT_ROW)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::mock::{DisplayOp, MockDisplay};

    #[test]
    fn centering() {
        assert_eq!(centered_x("MONITORING"), 24);
        assert_eq!(centered_x("SOUNDS"), 40);
        assert_eq!(centered_x("SILENCE"), 36);
        // Too wide to centre: pinned to the left edge.
        assert_eq!(centered_x("ABCDEFGHIJKLMNOPQRSTU"), 0);
    }

    #[test]
    fn idle_screen_draws_without_flush() {
        let mut display = MockDisplay::new();
        draw_idle(&mut display).unwrap();
        assert_eq!(display.ops[0], DisplayOp::Fill(false));
        assert_eq!(display.ops[1], DisplayOp::Rect(3, 3, 122, 60, true, false));
        assert_eq!(display.ops[2], DisplayOp::Text("MONITORING".into(), 24, 20));
        assert_eq!(display.ops[3], DisplayOp::Text("SOUNDS".into(), 40, 35));
        assert_eq!(display.flushes(), 0);
    }

    #[test]
    fn alert_screen() {
        let mut display = MockDisplay::new();
        draw_alert(&mut display).unwrap();
        assert_eq!(display.last_text(), Some("SILENCE"));
        assert_eq!(display.flushes(), 0);
    }
}
