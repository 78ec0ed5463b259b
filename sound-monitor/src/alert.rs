//! Silence alert: a timed state machine polled from the main loop.
//!
//! When the completion handler has counted [`ALERT_EVENT_THRESHOLD`]
//! extreme windows, the next [`poll`](AlertMachine::poll) enters the alert:
//! the display shows the alert message inside a border, the buzzers sound if
//! the tone flag is set, and the border blinks every [`BORDER_BLINK_MS`].
//! After [`ALERT_DURATION_MS`] the tone stops and the idle screen returns.
//!
//! ```text
//!         events >= threshold
//!  Idle ───────────────────────► Alerting ──┐ blink every 50 ms
//!   ▲                               │  ▲    │
//!   └──────── 500 ms elapsed ───────┘  └────┘
//! ```
//!
//! Capture keeps running during an alert. Extreme windows seen while alerting
//! count toward the next alert; the counter was reset on entry.

use crate::constants::{ALERT_DURATION_MS, ALERT_EVENT_THRESHOLD, BORDER_BLINK_MS};
use crate::control::{MonoDisplay, ToneOutput};
use crate::monitor::SinkError;
use crate::render::{draw_alert, draw_border, draw_idle};
use crate::state::SharedState;
use crate::time::has_elapsed;

/// Where the alert is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertState {
    Idle,
    Alerting {
        started_ms: u32,
        last_blink_ms: u32,
        border_on: bool,
        /// Tone flag sampled on entry.
        tone: bool,
    },
}

/// What the outputs should do after a [`poll`](AlertMachine::poll).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertAction {
    /// Not alerting and nothing to start.
    None,
    /// Alert started: draw the alert screen, start the tone if `tone`.
    Enter { tone: bool },
    /// Redraw the border in the new colour.
    Blink { border_on: bool },
    /// Alerting, nothing due yet.
    Hold,
    /// Alert over: stop the tone if `tone`, restore the idle screen.
    Exit { tone: bool },
}

pub struct AlertMachine {
    state: AlertState,
    threshold: u32,
    duration_ms: u32,
    blink_ms: u32,
}

impl AlertMachine {
    pub const fn new() -> Self {
        AlertMachine {
            state: AlertState::Idle,
            threshold: ALERT_EVENT_THRESHOLD,
            duration_ms: ALERT_DURATION_MS,
            blink_ms: BORDER_BLINK_MS,
        }
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    pub fn is_alerting(&self) -> bool {
        matches!(self.state, AlertState::Alerting { .. })
    }

    /// Advance the machine to `now_ms`.
    ///
    /// Expiry is checked before the blink, so the last blink of an alert is
    /// never drawn over the idle screen.
    pub fn poll(&mut self, now_ms: u32, shared: &SharedState) -> AlertAction {
        match self.state {
            AlertState::Idle => {
                if !shared.take_extreme_events(self.threshold) {
                    return AlertAction::None;
                }
                let tone = shared.modes.tone_enabled();
                self.state = AlertState::Alerting {
                    started_ms: now_ms,
                    last_blink_ms: now_ms,
                    border_on: true,
                    tone,
                };
                #[cfg(feature = "defmt")]
                defmt::info!("alert start at {} ms, tone {}", now_ms, tone);
                AlertAction::Enter { tone }
            }
            AlertState::Alerting {
                started_ms,
                last_blink_ms,
                border_on,
                tone,
            } => {
                if has_elapsed(now_ms, started_ms, self.duration_ms) {
                    self.state = AlertState::Idle;
                    #[cfg(feature = "defmt")]
                    defmt::info!("alert end at {} ms", now_ms);
                    AlertAction::Exit { tone }
                } else if has_elapsed(now_ms, last_blink_ms, self.blink_ms) {
                    let border_on = !border_on;
                    self.state = AlertState::Alerting {
                        started_ms,
                        last_blink_ms: now_ms,
                        border_on,
                        tone,
                    };
                    AlertAction::Blink { border_on }
                } else {
                    AlertAction::Hold
                }
            }
        }
    }

    /// Carry out `action` on the display and tone.
    pub fn apply<D, T>(
        action: AlertAction,
        display: &mut D,
        tone: &mut T,
    ) -> Result<(), SinkError<D::Error, T::Error>>
    where
        D: MonoDisplay,
        T: ToneOutput,
    {
        match action {
            AlertAction::None | AlertAction::Hold => {}
            AlertAction::Enter { tone: sound } => {
                draw_alert(display).map_err(SinkError::Display)?;
                draw_border(display, true).map_err(SinkError::Display)?;
                display.flush().map_err(SinkError::Display)?;
                if sound {
                    tone.tone_on().map_err(SinkError::Tone)?;
                }
            }
            AlertAction::Blink { border_on } => {
                draw_border(display, border_on).map_err(SinkError::Display)?;
                display.flush().map_err(SinkError::Display)?;
            }
            AlertAction::Exit { tone: sound } => {
                // Both sinks are restored even if the other one fails; the
                // first error is reported.
                let silenced = if sound {
                    tone.tone_off().map_err(SinkError::Tone)
                } else {
                    Ok(())
                };
                let redrawn = draw_idle(display)
                    .and_then(|()| display.flush())
                    .map_err(SinkError::Display);
                silenced?;
                redrawn?;
            }
        }
        Ok(())
    }

    /// Poll once and, if an alert starts, spin on `now` until it ends.
    ///
    /// Returns whether an alert ran. Nothing else on the calling context
    /// runs meanwhile.
    pub fn run_blocking<D, T>(
        &mut self,
        mut now: impl FnMut() -> u32,
        shared: &SharedState,
        display: &mut D,
        tone: &mut T,
    ) -> Result<bool, SinkError<D::Error, T::Error>>
    where
        D: MonoDisplay,
        T: ToneOutput,
    {
        let action = self.poll(now(), shared);
        Self::apply(action, display, tone)?;
        if !self.is_alerting() {
            return Ok(false);
        }
        while self.is_alerting() {
            let action = self.poll(now(), shared);
            Self::apply(action, display, tone)?;
        }
        Ok(true)
    }
}

impl Default for AlertMachine {
    fn default() -> Self {
        Self::new()
    }
}
