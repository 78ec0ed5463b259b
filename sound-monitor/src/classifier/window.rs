//! Per-window amplitude metrics.

/// Absolute deviation of `sample` from the silence midpoint.
#[inline(always)]
pub fn deviation(sample: u16, silence: u16) -> u16 {
    (sample as i32 - silence as i32).unsigned_abs() as u16
}

/// Which reduction of a window drives the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AmplitudeMetric {
    /// Largest absolute deviation in the window.
    #[default]
    Peak,
    /// Mean absolute deviation over the window.
    Mean,
}

/// Reduction of one completed sample window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindowSummary {
    /// Largest absolute deviation.
    pub peak: u16,
    /// Sum of absolute deviations.
    pub sum: u32,
    /// Number of samples reduced.
    pub count: u32,
}

impl WindowSummary {
    /// Reduce `samples` around `silence` in a single pass.
    ///
    /// `sum` and `count` saturate at `u32::MAX`, which no
    /// [`WINDOW_SAMPLES`](crate::constants::WINDOW_SAMPLES) window approaches.
    pub fn measure(samples: &[u16], silence: u16) -> Self {
        let mut summary = WindowSummary::default();
        for &sample in samples {
            let amplitude = deviation(sample, silence);
            summary.sum = summary.sum.saturating_add(amplitude as u32);
            if amplitude > summary.peak {
                summary.peak = amplitude;
            }
        }
        summary.count = u32::try_from(samples.len()).unwrap_or(u32::MAX);
        summary
    }

    /// Mean absolute deviation, 0 for an empty window.
    pub fn mean(&self) -> u16 {
        if self.count == 0 {
            0
        } else {
            (self.sum / self.count) as u16
        }
    }

    /// The amplitude `metric` selects.
    pub fn amplitude(&self, metric: AmplitudeMetric) -> u16 {
        match metric {
            AmplitudeMetric::Peak => self.peak,
            AmplitudeMetric::Mean => self.mean(),
        }
    }
}
