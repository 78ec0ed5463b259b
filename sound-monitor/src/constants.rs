//! Fixed parameters of the monitor. There is no runtime configuration.

/// ADC reading for zero acoustic amplitude (midpoint of the 12-bit range).
pub const SILENCE_LEVEL: u16 = 2048;

/// Number of 16-bit samples per DMA window.
pub const WINDOW_SAMPLES: usize = 79;

/// Integer part of the ADC FIFO clock divider.
pub const ADC_CLOCK_DIVIDER: u16 = 21;

/// Fractional part (1/256 units) of the ADC FIFO clock divider.
pub const ADC_CLOCK_DIVIDER_FRAC: u8 = 0;

/// ADC input channel the microphone is wired to (GPIO28).
pub const MIC_CHANNEL: u8 = 2;

/// RP2040 ADC reference clock.
pub const ADC_CLOCK_HZ: u32 = 48_000_000;

/// Minimum ADC cycles per conversion.
pub const ADC_CYCLES_PER_CONVERSION: u32 = 96;

/// Ascending amplitude boundaries. A window's level is the number of
/// boundaries its amplitude reaches (`amplitude >= boundary`).
pub const LEVEL_BOUNDARIES: [u16; 5] = [100, 250, 350, 450, 750];

/// Highest level; a window classified here counts as an extreme event.
pub const MAX_LEVEL: u8 = LEVEL_BOUNDARIES.len() as u8;

/// Number of levels kept in the history (one per matrix column).
pub const HISTORY_LEN: usize = 5;

/// Minimum time between two renders of the LED matrix.
pub const RENDER_INTERVAL_MS: u32 = 75;

/// Edges closer than this to the last accepted edge are ignored.
pub const DEBOUNCE_MS: u32 = 200;

/// Extreme events needed to raise an alert.
pub const ALERT_EVENT_THRESHOLD: u32 = 20;

/// Duration of an alert (tone pulse and blinking border).
pub const ALERT_DURATION_MS: u32 = 500;

/// Period of the border toggle while alerting.
pub const BORDER_BLINK_MS: u32 = 50;

/// Period of the console statistics report.
pub const REPORT_INTERVAL_MS: u32 = 3000;

/// LED matrix columns.
pub const GRID_COLUMNS: usize = 5;

/// LED matrix rows.
pub const GRID_ROWS: usize = 5;

/// Total addressable cells in the LED matrix.
pub const NUM_CELLS: usize = GRID_COLUMNS * GRID_ROWS;

/// Alert tone frequency.
pub const TONE_FREQUENCY_HZ: u32 = 2000;

/// Monochrome display width in pixels.
pub const DISPLAY_WIDTH: u8 = 128;

/// Monochrome display height in pixels.
pub const DISPLAY_HEIGHT: u8 = 64;

/// Glyph width of the display font in pixels.
pub const FONT_WIDTH: u8 = 8;

/// Sample rate produced by the ADC FIFO for a given divider.
///
/// The RP2040 ADC starts a conversion every `1 + divider` cycles of its
/// 48 MHz clock, but never faster than one every 96 cycles.
pub const fn adc_sample_rate_hz(divider: u16, frac: u8) -> u32 {
    // Work in 1/256 cycle units to keep the fractional part.
    let period_256 = (1 + divider as u32) * 256 + frac as u32;
    let min_period_256 = ADC_CYCLES_PER_CONVERSION * 256;
    let period_256 = if period_256 < min_period_256 {
        min_period_256
    } else {
        period_256
    };
    ((ADC_CLOCK_HZ as u64 * 256) / period_256 as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_ascending() {
        for pair in LEVEL_BOUNDARIES.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(MAX_LEVEL, 5);
    }

    #[test]
    fn sample_rate_clamps_to_conversion_time() {
        // 21 < 96, so the ADC runs flat out at 500 kS/s.
        assert_eq!(adc_sample_rate_hz(21, 0), 500_000);
        // Dividers above the conversion time set the period directly.
        assert_eq!(adc_sample_rate_hz(47_999, 0), 1_000);
        assert_eq!(adc_sample_rate_hz(191, 128), 249_350);
    }
}
