//! Glue between the interrupt contexts and the main loop.
//!
//! [`CaptureHandler`] is the completion interrupt's side: it owns the
//! transfer engine and the classifier, services each window and pushes due
//! frames to the LED matrix. [`Supervisor`] is the main loop's side: it runs
//! the alert machine and, when no alert is active, the periodic report.

use core::fmt;

use crate::alert::{AlertAction, AlertMachine};
use crate::classifier::{Classification, Classifier};
use crate::constants::REPORT_INTERVAL_MS;
use crate::control::{LedMatrix, MonoDisplay, ToneOutput};
use crate::io::{CaptureControl, SampleSource, TransferChannel, TransferEngine};
use crate::render::{draw_idle, Report};
use crate::state::SharedState;
use crate::time::has_elapsed;

/// Failure of one of the main loop's outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError<D, T> {
    Display(D),
    Tone(T),
    /// The console writer returned [`fmt::Error`].
    Console,
}

impl<D, T> From<fmt::Error> for SinkError<D, T> {
    fn from(_: fmt::Error) -> Self {
        SinkError::Console
    }
}

// ── Completion side ────────────────────────────────────────────────────────

/// Transfer engine plus classifier, serviced from the completion interrupt.
///
/// Also the [`CaptureControl`] the capture button drives, so the button and
/// completion tasks must share it under a lock.
pub struct CaptureHandler<C, S> {
    engine: TransferEngine<C, S>,
    classifier: Classifier,
}

impl<C, S> CaptureHandler<C, S>
where
    C: TransferChannel,
    S: SampleSource,
{
    pub fn new(engine: TransferEngine<C, S>, classifier: Classifier) -> Self {
        CaptureHandler { engine, classifier }
    }

    /// Service a completion interrupt.
    ///
    /// The window is classified, the channel rearmed, and only then is a due
    /// frame pushed to `matrix`. Returns the classification if a window was
    /// delivered.
    pub fn on_completion<M: LedMatrix>(
        &mut self,
        now_ms: u32,
        shared: &SharedState,
        matrix: &mut M,
    ) -> Result<Option<Classification>, M::Error> {
        let classifier = &mut self.classifier;
        let classified = self
            .engine
            .service(|window| classifier.on_window(window, now_ms, shared));
        if let Some(frame) = classified.as_ref().and_then(|c| c.frame.as_ref()) {
            matrix.write_frame(frame)?;
        }
        Ok(classified)
    }

    pub fn engine(&self) -> &TransferEngine<C, S> {
        &self.engine
    }

    #[cfg(test)]
    pub(crate) fn engine_mut(&mut self) -> &mut TransferEngine<C, S> {
        &mut self.engine
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn release(self) -> (TransferEngine<C, S>, Classifier) {
        (self.engine, self.classifier)
    }
}

impl<C, S> CaptureControl for CaptureHandler<C, S>
where
    C: TransferChannel,
    S: SampleSource,
{
    fn pause(&mut self) {
        self.engine.stop();
        #[cfg(feature = "defmt")]
        defmt::info!("capture paused");
    }

    /// The first window after a resume renders immediately.
    fn resume(&mut self) {
        self.classifier.reset_render_clock();
        self.engine.start();
        #[cfg(feature = "defmt")]
        defmt::info!("capture resumed");
    }

    fn is_capturing(&self) -> bool {
        self.engine.is_running()
    }
}

// ── Main loop side ─────────────────────────────────────────────────────────

/// What one [`Supervisor::poll`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tick {
    /// Nothing due.
    Idle,
    /// An alert is running or just ended; reports wait.
    Alerting,
    /// The statistics were taken. `printed` is false when reporting is off.
    Reported { printed: bool },
}

/// Main loop work: alerts first, reports when no alert holds the outputs.
pub struct Supervisor {
    alert: AlertMachine,
    last_report_ms: u32,
    report_interval_ms: u32,
}

impl Supervisor {
    pub const fn new() -> Self {
        Supervisor {
            alert: AlertMachine::new(),
            last_report_ms: 0,
            report_interval_ms: REPORT_INTERVAL_MS,
        }
    }

    /// Draw the idle screen and start the report clock at `now_ms`.
    pub fn start<D: MonoDisplay>(&mut self, now_ms: u32, display: &mut D) -> Result<(), D::Error> {
        self.last_report_ms = now_ms;
        draw_idle(display)?;
        display.flush()
    }

    pub fn is_alerting(&self) -> bool {
        self.alert.is_alerting()
    }

    /// One pass of the main loop.
    pub fn poll<D, T, W>(
        &mut self,
        now_ms: u32,
        shared: &SharedState,
        display: &mut D,
        tone: &mut T,
        console: &mut W,
    ) -> Result<Tick, SinkError<D::Error, T::Error>>
    where
        D: MonoDisplay,
        T: ToneOutput,
        W: fmt::Write,
    {
        let action = self.alert.poll(now_ms, shared);
        AlertMachine::apply(action, display, tone)?;
        if action != AlertAction::None {
            return Ok(Tick::Alerting);
        }

        if !has_elapsed(now_ms, self.last_report_ms, self.report_interval_ms) {
            return Ok(Tick::Idle);
        }
        self.last_report_ms = now_ms;

        let stats = shared.stats.take();
        #[cfg(feature = "defmt")]
        defmt::debug!("report tick: {}", stats);
        let printed = shared.modes.reporting_enabled();
        if printed {
            write!(console, "{}", Report::new(stats))?;
        }
        Ok(Tick::Reported { printed })
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}
