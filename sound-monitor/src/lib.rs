//! # sound-monitor
//!
//! A `no_std` ambient sound level monitor for the RP2040 (Raspberry Pi Pico,
//! BitDogLab board). A microphone on the ADC is sampled continuously; each
//! DMA-filled window of samples is classified into a loudness level, shown
//! as a scrolling bar graph on a 5×5 WS2812 matrix, and folded into rolling
//! statistics printed on the serial console. A run of very loud windows
//! raises a visual and audible alert.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Config | [`constants`] | Thresholds, timings, geometry |
//! | Shared | [`state`] / [`time`] | Lock-free state between interrupt and main loop |
//! | I/O | [`io`] | ADC FIFO source, one-shot DMA window transfer |
//! | Analysis | [`classifier`] | Window reduction, levels, history |
//! | Output | [`render`] / [`control`] | LED frames, display screens, reports, tone |
//! | Control | [`mode`] / [`alert`] | Buttons, debounce, alert state machine |
//! | Glue | [`monitor`] | Completion handler and main loop supervisor |
//!
//! ## Execution contexts
//!
//! ```ignore
//! static SHARED: SharedState = SharedState::new();
//!
//! // DMA_IRQ_0
//! capture.on_completion(now_ms(), &SHARED, &mut matrix).ok();
//!
//! // IO_IRQ_BANK0
//! if let Some(change) = modes.on_edge(button, now_ms(), &SHARED) {
//!     apply_capture(change, &mut capture, &mut matrix).ok();
//!     change.announce(&SHARED, &mut console).ok();
//! }
//!
//! // main loop
//! loop {
//!     supervisor.poll(now_ms(), &SHARED, &mut display, &mut tone, &mut console).ok();
//! }
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `pwm-tone` | yes | [`render::PwmTone`] over `embedded-hal` PWM channels |
//! | `defmt` | no | `defmt::Format` on public types, debug logging |
//!
//! ## Acquisition parameters
//!
//! - **Window:** 79 samples ([`constants::WINDOW_SAMPLES`])
//! - **Sample rate:** 500 kHz ([`constants::adc_sample_rate_hz`])
//! - **Sample format:** `u16`, 12-bit, silence at 2048 ([`constants::SILENCE_LEVEL`])
//! - **Levels:** 0–5 over boundaries 100/250/350/450/750 ([`constants::LEVEL_BOUNDARIES`])

#![no_std]

#[cfg(test)]
extern crate std;

pub mod constants;
pub mod time;
pub mod state;
pub mod control;
pub mod io;
pub mod classifier;
pub mod render;
pub mod mode;
pub mod alert;
pub mod monitor;
