//! Free-running ADC sampling into the hardware FIFO.
//!
//! The ADC is configured once at startup ([`AdcFifoConfig`]) and then only
//! started and stopped. While running it pushes one conversion into its FIFO
//! every sample period, whether or not anything drains it. Stop it together
//! with the transfer channel, never on its own.

use crate::constants::{
    adc_sample_rate_hz, ADC_CLOCK_DIVIDER, ADC_CLOCK_DIVIDER_FRAC, MIC_CHANNEL,
};

/// A sample producer that can be paused.
pub trait SampleSource {
    /// Discard anything left in the FIFO, then begin free-running
    /// conversions.
    fn start(&mut self);

    /// Halt conversions. Samples already in the FIFO stay there.
    fn stop(&mut self);

    /// Whether conversions are running.
    fn is_running(&self) -> bool;
}

/// ADC FIFO settings applied at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcFifoConfig {
    /// Input channel to convert.
    pub channel: u8,
    /// Clock divider, integer part.
    pub divider_int: u16,
    /// Clock divider, fractional part in 1/256.
    pub divider_frac: u8,
    /// Keep all 12 bits (`false`) or only the top 8.
    pub shift_8bit: bool,
    /// Raise a DMA request per FIFO entry.
    pub dma: bool,
    /// Set bit 15 of conversions that reported an error.
    pub error_bit: bool,
}

impl AdcFifoConfig {
    /// Microphone channel, full 12-bit samples, DMA-paced.
    pub const fn microphone() -> Self {
        AdcFifoConfig {
            channel: MIC_CHANNEL,
            divider_int: ADC_CLOCK_DIVIDER,
            divider_frac: ADC_CLOCK_DIVIDER_FRAC,
            shift_8bit: false,
            dma: true,
            error_bit: false,
        }
    }

    pub const fn sample_rate_hz(&self) -> u32 {
        adc_sample_rate_hz(self.divider_int, self.divider_frac)
    }

    /// Time to fill a window of `samples` conversions, in microseconds.
    pub const fn window_period_us(&self, samples: usize) -> u32 {
        ((samples as u64 * 1_000_000) / self.sample_rate_hz() as u64) as u32
    }
}

impl Default for AdcFifoConfig {
    fn default() -> Self {
        Self::microphone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WINDOW_SAMPLES;

    #[test]
    fn microphone_defaults() {
        let config = AdcFifoConfig::microphone();
        assert_eq!(config.channel, 2);
        assert!(config.dma);
        assert!(!config.shift_8bit);
        assert_eq!(config.sample_rate_hz(), 500_000);
        assert_eq!(config.window_period_us(WINDOW_SAMPLES), 158);
    }

    #[test]
    fn slower_divider_stretches_window() {
        let config = AdcFifoConfig {
            divider_int: 47_999,
            ..AdcFifoConfig::microphone()
        };
        assert_eq!(config.sample_rate_hz(), 1_000);
        assert_eq!(config.window_period_us(WINDOW_SAMPLES), 79_000);
    }
}
