//! One-shot DMA transfer of ADC samples into a window buffer.
//!
//! [`TransferEngine`] pairs a [`TransferChannel`] (the DMA channel reading
//! the ADC FIFO register into a fixed window buffer) with the
//! [`SampleSource`] feeding it, and makes the rearm contract explicit:
//!
//! ```text
//!            start()                  completion IRQ
//! Stopped ──────────► Armed ──────────────────────────► Completed
//!    ▲                  ▲                                  │
//!    │ stop()           └────── rearm (always) ◄── handler ┘
//!    └─────────── from any state
//! ```
//!
//! The hardware does not repeat on its own. [`TransferEngine::service`] is
//! the only way to reach the window, and it rearms the channel after the
//! handler returns on every path that delivered a window. The handler runs
//! between "completion signalled" and "rearm issued", which is the only time
//! the buffer is not being written.
//!
//! ## Usage
//!
//! ```ignore
//! // DMA_IRQ_0 handler:
//! let classified = engine.service(|window| classifier.on_window(window, now, &SHARED));
//! ```
//!
//! No double buffering: if the handler is slow, the ADC FIFO overflows and
//! samples are dropped. That is accepted; nothing counts it.

use super::acquisition::SampleSource;

/// DMA channel bound to a fixed window buffer.
pub trait TransferChannel {
    /// Program a transfer of one full window into the buffer and start it.
    fn arm(&mut self);

    /// Abort any transfer in flight.
    fn disarm(&mut self);

    /// Check and acknowledge the completion interrupt.
    ///
    /// Returns `true` if a completion was pending.
    fn take_completion(&mut self) -> bool;

    /// Enable or disable the completion interrupt.
    fn set_completion_interrupt(&mut self, enabled: bool);

    /// The window buffer. `None` while the hardware owns it.
    fn window(&self) -> Option<&[u16]>;
}

/// Capture on/off control, as seen by the mode buttons.
pub trait CaptureControl {
    /// Stop sampling and transfers.
    fn pause(&mut self);

    /// Restart sampling into a freshly armed window.
    fn resume(&mut self);

    fn is_capturing(&self) -> bool;
}

/// Where the transfer engine is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferState {
    /// Interrupt masked, source halted, buffer contents undefined.
    Stopped,
    /// A transfer is in flight.
    Armed,
    /// The handler is reading the completed window.
    Completed,
}

/// DMA window transfer with an explicit rearm cycle.
pub struct TransferEngine<C, S> {
    channel: C,
    source: S,
    state: TransferState,
    completions: u32,
    spurious: u32,
}

impl<C, S> TransferEngine<C, S>
where
    C: TransferChannel,
    S: SampleSource,
{
    /// Take ownership of a configured channel and source. Nothing runs until
    /// [`start()`](Self::start).
    pub fn new(channel: C, source: S) -> Self {
        TransferEngine {
            channel,
            source,
            state: TransferState::Stopped,
            completions: 0,
            spurious: 0,
        }
    }

    /// Unmask the completion interrupt, arm the first window, start sampling.
    ///
    /// The channel is armed before the source starts so the first window
    /// begins with the first fresh conversion. No-op unless stopped.
    pub fn start(&mut self) {
        if self.state != TransferState::Stopped {
            return;
        }
        self.channel.set_completion_interrupt(true);
        self.channel.arm();
        self.source.start();
        self.state = TransferState::Armed;
    }

    /// Mask the completion interrupt, halt sampling, abort the transfer.
    pub fn stop(&mut self) {
        self.channel.set_completion_interrupt(false);
        self.source.stop();
        self.channel.disarm();
        self.state = TransferState::Stopped;
    }

    /// Handle a completion interrupt.
    ///
    /// If a window completed while armed, `handler` gets the window, the
    /// channel is rearmed and the handler's result returned. Completions seen
    /// while stopped are acknowledged and dropped.
    pub fn service<R>(&mut self, handler: impl FnOnce(&[u16]) -> R) -> Option<R> {
        if !self.channel.take_completion() {
            return None;
        }
        if self.state != TransferState::Armed {
            self.spurious = self.spurious.wrapping_add(1);
            return None;
        }

        self.state = TransferState::Completed;
        self.completions = self.completions.wrapping_add(1);
        let result = self.channel.window().map(handler);
        self.rearm();
        result
    }

    fn rearm(&mut self) {
        self.channel.arm();
        self.state = TransferState::Armed;
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state != TransferState::Stopped
    }

    /// Windows delivered to a handler since creation (wrapping).
    pub fn completions(&self) -> u32 {
        self.completions
    }

    /// Completions acknowledged while not armed (wrapping).
    pub fn spurious(&self) -> u32 {
        self.spurious
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    #[cfg(test)]
    pub(crate) fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    #[cfg(test)]
    pub(crate) fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Give back the channel and source.
    pub fn release(self) -> (C, S) {
        (self.channel, self.source)
    }
}

impl<C, S> CaptureControl for TransferEngine<C, S>
where
    C: TransferChannel,
    S: SampleSource,
{
    fn pause(&mut self) {
        self.stop();
    }

    fn resume(&mut self) {
        self.start();
    }

    fn is_capturing(&self) -> bool {
        self.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::mock::{MockChannel, MockSource};

    fn engine() -> TransferEngine<MockChannel, MockSource> {
        TransferEngine::new(MockChannel::new(), MockSource::new())
    }

    #[test]
    fn new_is_stopped() {
        let e = engine();
        assert_eq!(e.state(), TransferState::Stopped);
        assert!(!e.source().is_running());
        assert_eq!(e.channel().arms, 0);
    }

    #[test]
    fn start_arms_before_sampling() {
        let mut e = engine();
        e.start();
        assert_eq!(e.state(), TransferState::Armed);
        assert!(e.channel().irq_enabled);
        assert_eq!(e.channel().arms, 1);
        assert!(e.source().is_running());

        // Second start is ignored.
        e.start();
        assert_eq!(e.channel().arms, 1);
    }

    #[test]
    fn service_without_completion_does_nothing() {
        let mut e = engine();
        e.start();
        let mut called = false;
        assert_eq!(e.service(|_| called = true), None);
        assert!(!called);
        assert_eq!(e.channel().arms, 1);
    }

    #[test]
    fn service_delivers_window_then_rearms() {
        let mut e = engine();
        e.start();
        e.channel_mut().complete_with(&[1, 2, 3]);

        let sum = e.service(|w| {
            assert_eq!(w, &[1, 2, 3]);
            w.iter().map(|&s| s as u32).sum::<u32>()
        });

        assert_eq!(sum, Some(6));
        assert_eq!(e.state(), TransferState::Armed);
        assert_eq!(e.channel().arms, 2);
        assert_eq!(e.completions(), 1);
        assert!(!e.channel().pending);
    }

    #[test]
    fn window_hidden_while_in_flight() {
        let mut e = engine();
        e.start();
        assert!(e.channel().window().is_none());
        e.channel_mut().complete_with(&[7; 4]);
        assert_eq!(e.service(|w| w.len()), Some(4));
        assert!(e.channel().window().is_none());
    }

    #[test]
    fn stop_masks_halts_and_disarms() {
        let mut e = engine();
        e.start();
        e.stop();
        assert_eq!(e.state(), TransferState::Stopped);
        assert!(!e.channel().irq_enabled);
        assert!(!e.source().is_running());
        assert_eq!(e.channel().disarms, 1);
    }

    #[test]
    fn completion_while_stopped_is_dropped() {
        let mut e = engine();
        e.start();
        e.stop();
        e.channel_mut().complete_with(&[9; 4]);
        assert_eq!(e.service(|_| ()), None);
        assert_eq!(e.spurious(), 1);
        assert_eq!(e.channel().arms, 1, "must not rearm while stopped");
        assert!(!e.channel().pending);
    }

    #[test]
    fn resume_rearms_fresh_window() {
        let mut e = engine();
        e.resume();
        e.pause();
        assert!(!e.is_capturing());
        e.resume();
        assert!(e.is_capturing());
        assert_eq!(e.channel().arms, 2);
        assert_eq!(e.source().starts, 2);
    }

    #[test]
    fn resume_starts_from_an_empty_fifo() {
        let mut e = engine();
        e.resume();
        e.source_mut().convert(10);
        e.pause();
        assert_eq!(e.source().queued, 4);

        e.resume();
        assert_eq!(e.source().queued, 0);
    }
}
