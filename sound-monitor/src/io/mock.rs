//! Software stand-ins for the DMA channel and the ADC.

use std::vec::Vec;

use super::acquisition::SampleSource;
use super::transfer::TransferChannel;

/// DMA channel whose completions are raised by the test.
pub struct MockChannel {
    pub buffer: Vec<u16>,
    pub pending: bool,
    pub in_flight: bool,
    pub irq_enabled: bool,
    pub arms: u32,
    pub disarms: u32,
}

impl MockChannel {
    pub fn new() -> Self {
        MockChannel {
            buffer: Vec::new(),
            pending: false,
            in_flight: false,
            irq_enabled: false,
            arms: 0,
            disarms: 0,
        }
    }

    /// Pretend the hardware filled the window with `samples`.
    pub fn complete_with(&mut self, samples: &[u16]) {
        self.buffer.clear();
        self.buffer.extend_from_slice(samples);
        self.in_flight = false;
        self.pending = true;
    }
}

impl TransferChannel for MockChannel {
    fn arm(&mut self) {
        self.in_flight = true;
        self.arms += 1;
    }

    fn disarm(&mut self) {
        self.in_flight = false;
        self.disarms += 1;
    }

    fn take_completion(&mut self) -> bool {
        core::mem::replace(&mut self.pending, false)
    }

    fn set_completion_interrupt(&mut self, enabled: bool) {
        self.irq_enabled = enabled;
    }

    fn window(&self) -> Option<&[u16]> {
        if self.in_flight {
            None
        } else {
            Some(&self.buffer)
        }
    }
}

pub struct MockSource {
    pub running: bool,
    pub starts: u32,
    pub stops: u32,
    /// Conversions sitting in the modelled four-entry FIFO.
    pub queued: u8,
}

impl MockSource {
    pub fn new() -> Self {
        MockSource {
            running: false,
            starts: 0,
            stops: 0,
            queued: 0,
        }
    }

    /// Let `n` conversions happen; the FIFO holds the last four.
    pub fn convert(&mut self, n: u8) {
        if self.running {
            self.queued = self.queued.saturating_add(n).min(4);
        }
    }
}

impl SampleSource for MockSource {
    fn start(&mut self) {
        self.queued = 0;
        self.running = true;
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.running = false;
        self.stops += 1;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
