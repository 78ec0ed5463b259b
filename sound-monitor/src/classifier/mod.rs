//! Loudness classification of completed sample windows.
//!
//! Runs inside the transfer-completion handler. For each window it:
//!
//! 1. reduces the samples to a [`WindowSummary`] (peak and mean deviation
//!    from silence),
//! 2. buckets the selected metric into a [`Level`],
//! 3. folds the window into the rolling statistics and, at the top level,
//!    counts an extreme event,
//! 4. at most once per [`RENDER_INTERVAL_MS`], pushes the level into the
//!    [`LevelHistory`] and produces the LED [`Frame`].
//!
//! Statistics are updated for every window; only the history and the render
//! are rate-limited.

mod history;
mod level;
mod window;

pub use history::LevelHistory;
pub use level::{classify, classify_default, Level};
pub use window::{deviation, AmplitudeMetric, WindowSummary};

use crate::constants::{LEVEL_BOUNDARIES, RENDER_INTERVAL_MS, SILENCE_LEVEL};
use crate::render::Frame;
use crate::state::SharedState;
use crate::time::has_elapsed;

/// Outcome of classifying one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub summary: WindowSummary,
    pub level: Level,
    /// Present when this window was due for a render.
    pub frame: Option<Frame>,
}

/// Window classifier. Owned by the completion handler.
pub struct Classifier {
    metric: AmplitudeMetric,
    silence: u16,
    boundaries: [u16; LEVEL_BOUNDARIES.len()],
    render_interval_ms: u32,
    history: LevelHistory,
    last_render_ms: Option<u32>,
}

impl Classifier {
    /// Peak metric, default boundaries and render interval.
    pub const fn new() -> Self {
        Self::with_metric(AmplitudeMetric::Peak)
    }

    pub const fn with_metric(metric: AmplitudeMetric) -> Self {
        Classifier {
            metric,
            silence: SILENCE_LEVEL,
            boundaries: LEVEL_BOUNDARIES,
            render_interval_ms: RENDER_INTERVAL_MS,
            history: LevelHistory::new(),
            last_render_ms: None,
        }
    }

    pub fn metric(&self) -> AmplitudeMetric {
        self.metric
    }

    /// History as of the last render.
    pub fn history(&self) -> &LevelHistory {
        &self.history
    }

    /// Make the next window render regardless of when the last one did.
    pub fn reset_render_clock(&mut self) {
        self.last_render_ms = None;
    }

    /// Classify one completed window.
    pub fn on_window(
        &mut self,
        samples: &[u16],
        now_ms: u32,
        shared: &SharedState,
    ) -> Classification {
        let summary = WindowSummary::measure(samples, self.silence);
        let level = classify(summary.amplitude(self.metric), &self.boundaries);

        shared.stats.record_window(&summary, level);
        if level.is_max() {
            shared.record_extreme_event();
        }

        let due = match self.last_render_ms {
            None => true,
            Some(last) => has_elapsed(now_ms, last, self.render_interval_ms),
        };

        let frame = if due {
            self.history.push(level);
            shared.publish_history(&self.history);
            self.last_render_ms = Some(now_ms);
            Some(Frame::from_history(&self.history))
        } else {
            None
        };

        Classification {
            summary,
            level,
            frame,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{HISTORY_LEN, WINDOW_SAMPLES};

    /// Silence with a single spike of `peak` above the midpoint.
    fn spike(peak: u16) -> [u16; WINDOW_SAMPLES] {
        let mut w = [SILENCE_LEVEL; WINDOW_SAMPLES];
        w[WINDOW_SAMPLES / 2] = SILENCE_LEVEL + peak;
        w
    }

    #[test]
    fn first_window_renders() {
        let shared = SharedState::new();
        let mut c = Classifier::new();
        let out = c.on_window(&spike(300), 0, &shared);
        assert_eq!(out.level.get(), 2);
        assert!(out.frame.is_some());
        assert_eq!(c.history().newest().get(), 2);
        assert_eq!(shared.history_snapshot(), *c.history());
    }

    #[test]
    fn render_rate_limited_stats_not() {
        let shared = SharedState::new();
        let mut c = Classifier::new();
        let mut renders = 0;
        let mut last_render_at = None;

        // Completions every 10 ms for one second.
        for i in 0..100u32 {
            let now = i * 10;
            let out = c.on_window(&spike(500), now, &shared);
            if out.frame.is_some() {
                if let Some(prev) = last_render_at {
                    assert!(now - prev >= RENDER_INTERVAL_MS);
                }
                last_render_at = Some(now);
                renders += 1;
            }
        }

        // Renders at 0, 80, 160, ... 960
        assert_eq!(renders, 13);
        let stats = shared.stats.snapshot();
        assert_eq!(stats.count_samples, 100 * WINDOW_SAMPLES as u32);
        assert_eq!(stats.max_peak, 500);
    }

    #[test]
    fn history_frozen_between_renders() {
        let shared = SharedState::new();
        let mut c = Classifier::new();
        c.on_window(&spike(800), 0, &shared);
        let frozen = *c.history();
        c.on_window(&spike(0), 10, &shared);
        c.on_window(&spike(0), 74, &shared);
        assert_eq!(*c.history(), frozen);
        c.on_window(&spike(0), 75, &shared);
        assert_eq!(c.history().newest(), Level::SILENT);
    }

    #[test]
    fn extreme_windows_counted() {
        let shared = SharedState::new();
        let mut c = Classifier::new();
        c.on_window(&spike(750), 0, &shared);
        c.on_window(&spike(749), 1, &shared);
        c.on_window(&spike(2000), 2, &shared);

        assert_eq!(shared.extreme_events(), 2);
        let stats = shared.stats.snapshot();
        assert_eq!(stats.count_peaks, 2);
        assert_eq!(stats.sum_peaks, 2750);
        assert_eq!(stats.max_peak, 2000);
    }

    #[test]
    fn mean_metric() {
        let shared = SharedState::new();
        let mut c = Classifier::with_metric(AmplitudeMetric::Mean);
        // One big spike barely moves the mean.
        let out = c.on_window(&spike(2000), 0, &shared);
        assert_eq!(out.summary.peak, 2000);
        assert_eq!(out.level, Level::SILENT);

        let loud = [SILENCE_LEVEL + 300; WINDOW_SAMPLES];
        let out = c.on_window(&loud, 100, &shared);
        assert_eq!(out.level.get(), 2);
    }

    #[test]
    fn reset_render_clock_forces_render() {
        let shared = SharedState::new();
        let mut c = Classifier::new();
        c.on_window(&spike(0), 0, &shared);
        assert!(c.on_window(&spike(0), 5, &shared).frame.is_none());
        c.reset_render_clock();
        assert!(c.on_window(&spike(0), 6, &shared).frame.is_some());
    }

    #[test]
    fn history_has_fixed_length() {
        let shared = SharedState::new();
        let mut c = Classifier::new();
        for i in 0..12u32 {
            c.on_window(&spike(100 * i as u16), i * 100, &shared);
        }
        assert_eq!(c.history().levels().len(), HISTORY_LEN);
        // Newest: 1100 → 5, oldest of the five: 700 → 4
        assert_eq!(c.history().newest(), Level::MAX);
        assert_eq!(c.history().oldest().get(), 4);
    }
}
