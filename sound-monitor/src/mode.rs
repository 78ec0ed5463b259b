//! Button-driven mode toggles with per-button debounce.
//!
//! Each of the three buttons flips one [`ModeFlag`]. Edges arrive from the
//! GPIO interrupt; an edge within [`DEBOUNCE_MS`] of that button's last
//! accepted edge is dropped without touching the timestamp.
//!
//! Toggling capture has side effects that run synchronously in the button
//! interrupt ([`apply_capture`]): pause stops the transfer engine and blanks
//! the matrix; resume rearms a fresh window. Tone and reporting only flip
//! their flag; other components read it when they need it.
//!
//! ```ignore
//! // IO_IRQ_BANK0 handler:
//! if let Some(change) = modes.on_edge(Button::Capture, now, &SHARED) {
//!     apply_capture(change, &mut capture, &mut matrix).ok();
//!     change.announce(&SHARED, &mut console).ok();
//! }
//! ```

use core::fmt;

use crate::constants::DEBOUNCE_MS;
use crate::control::LedMatrix;
use crate::io::CaptureControl;
use crate::render::Frame;
use crate::state::{ModeFlag, SharedState};
use crate::time::elapsed_ms;

/// The three physical buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Button A: capture on/off.
    Capture,
    /// Button B: alert tone on/off.
    Tone,
    /// Joystick button: console reporting on/off.
    Reporting,
}

impl Button {
    pub const ALL: [Button; 3] = [Button::Capture, Button::Tone, Button::Reporting];

    /// The flag this button toggles.
    pub const fn flag(self) -> ModeFlag {
        match self {
            Button::Capture => ModeFlag::Capture,
            Button::Tone => ModeFlag::Tone,
            Button::Reporting => ModeFlag::Reporting,
        }
    }

    const fn index(self) -> usize {
        match self {
            Button::Capture => 0,
            Button::Tone => 1,
            Button::Reporting => 2,
        }
    }
}

/// Last accepted edge per button.
#[derive(Debug, Clone)]
pub struct Debouncer {
    last_accepted: [Option<u32>; 3],
    window_ms: u32,
}

impl Debouncer {
    pub const fn new() -> Self {
        Self::with_window(DEBOUNCE_MS)
    }

    pub const fn with_window(window_ms: u32) -> Self {
        Debouncer {
            last_accepted: [None; 3],
            window_ms,
        }
    }

    /// Accept the edge unless it is within the window of the previous
    /// accepted edge on the same button. The first edge is always accepted.
    pub fn accept(&mut self, button: Button, now_ms: u32) -> bool {
        let slot = &mut self.last_accepted[button.index()];
        match *slot {
            Some(last) if elapsed_ms(now_ms, last) <= self.window_ms => false,
            _ => {
                *slot = Some(now_ms);
                true
            }
        }
    }

    /// Last accepted edge time for `button`.
    pub fn last_accepted(&self, button: Button) -> Option<u32> {
        self.last_accepted[button.index()]
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}

/// A flag after an accepted toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeChange {
    pub flag: ModeFlag,
    pub enabled: bool,
}

impl ModeChange {
    /// Whether the console line for this change should be printed.
    ///
    /// Capture and tone announcements follow the reporting flag. The
    /// reporting toggle announces only when it turns reporting back on.
    pub fn should_announce(&self, shared: &SharedState) -> bool {
        match self.flag {
            ModeFlag::Reporting => self.enabled,
            _ => shared.modes.reporting_enabled(),
        }
    }

    /// Print the console line if [`should_announce`](Self::should_announce).
    pub fn announce<W: fmt::Write>(&self, shared: &SharedState, console: &mut W) -> fmt::Result {
        if self.should_announce(shared) {
            writeln!(console, "{self}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ModeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.enabled { "ENABLED" } else { "DISABLED" };
        match self.flag {
            ModeFlag::Capture => write!(f, "\n--> Sound capture {state}"),
            ModeFlag::Tone => write!(f, "\n--> Alert tone {state}"),
            ModeFlag::Reporting => write!(f, "\n-- CONSOLE REPORTING {state} --"),
        }
    }
}

/// Debounces button edges and flips the mode flags.
#[derive(Debug, Clone, Default)]
pub struct ModeController {
    debouncer: Debouncer,
}

impl ModeController {
    pub const fn new() -> Self {
        ModeController {
            debouncer: Debouncer::new(),
        }
    }

    /// Handle a falling edge on `button`.
    ///
    /// Returns the new flag state when the edge was accepted.
    pub fn on_edge(
        &mut self,
        button: Button,
        now_ms: u32,
        shared: &SharedState,
    ) -> Option<ModeChange> {
        if !self.debouncer.accept(button, now_ms) {
            return None;
        }
        let flag = button.flag();
        let enabled = shared.modes.toggle(flag);
        #[cfg(feature = "defmt")]
        defmt::debug!("mode {} -> {}", flag, enabled);
        Some(ModeChange { flag, enabled })
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }
}

/// Run the capture side effects of `change`.
///
/// Disabling stops the engine and blanks the matrix; enabling restarts it.
/// Changes to other flags are ignored.
pub fn apply_capture<C, M>(change: ModeChange, capture: &mut C, matrix: &mut M) -> Result<(), M::Error>
where
    C: CaptureControl,
    M: LedMatrix,
{
    if change.flag != ModeFlag::Capture {
        return Ok(());
    }
    if change.enabled {
        capture.resume();
        Ok(())
    } else {
        capture.pause();
        matrix.write_frame(&Frame::off())
    }
}
