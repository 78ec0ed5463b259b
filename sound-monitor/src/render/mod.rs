//! Rendering of classified levels to the outputs.
//!
//! | Output | Module | Content |
//! |--------|--------|---------|
//! | LED matrix | [`frame`], [`color`] | one column per history slot, lit bottom-up |
//! | Display | [`screen`] | idle caption, alert message, blinking border |
//! | Console | [`report`] | periodic statistics |
//! | Buzzers | [`tone`] | PWM square wave (feature `pwm-tone`) |

pub mod color;
pub mod frame;
pub mod report;
pub mod screen;

#[cfg(feature = "pwm-tone")]
pub mod tone;

pub use color::{level_color, Rgb};
pub use frame::{Frame, COLUMN_CELLS};
pub use report::Report;
pub use screen::{draw_alert, draw_border, draw_idle, BORDER};

#[cfg(feature = "pwm-tone")]
pub use tone::{pwm_top, PwmTone};
