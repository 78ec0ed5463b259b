//! Sample acquisition: ADC FIFO and the one-shot DMA window transfer.
//!
//! ## Components
//!
//! | Item | Role |
//! |------|------|
//! | [`SampleSource`] | free-running ADC conversions into the FIFO |
//! | [`AdcFifoConfig`] | channel, clock divider and FIFO flags applied at startup |
//! | [`TransferChannel`] | DMA channel reading the FIFO into the window buffer |
//! | [`TransferEngine`] | start/stop and the rearm-after-every-window cycle |
//!
//! ## Window Layout
//!
//! One window is `[u16; 79]` of raw 12-bit conversions, oldest first. The DMA
//! channel is paced by the ADC's DREQ and raises `DMA_IRQ_0` once the last
//! sample lands. There is one buffer only: the handler reads it between the
//! completion and the rearm.

pub mod acquisition;
pub mod transfer;

pub use acquisition::{AdcFifoConfig, SampleSource};
pub use transfer::{CaptureControl, TransferChannel, TransferEngine, TransferState};

#[cfg(test)]
pub(crate) mod mock;
