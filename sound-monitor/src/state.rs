//! State shared between the interrupt handlers and the main loop.
//!
//! [`SharedState`] lives in a `static` and is read and written without locks.
//! Every field has exactly one writing context:
//!
//! | Field | Writer | Readers |
//! |-------|--------|---------|
//! | [`ModeFlags`] | button ISR | everyone |
//! | history snapshot | completion ISR | main loop |
//! | [`RollingStats`] | completion ISR (accumulate) | main loop (`take`) |
//! | extreme event counter | completion ISR (increment) | main loop (`take_extreme_events`) |
//!
//! The main loop's only mutations are the read-and-zero operations, which go
//! through `swap` so no accumulated value is lost. Atomics come from
//! `portable-atomic` so the same code works on Cortex-M0+, which has no
//! native read-modify-write instructions.

use portable_atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};

use crate::classifier::{Level, LevelHistory, WindowSummary};
use crate::constants::HISTORY_LEN;

// ── Mode flags ─────────────────────────────────────────────────────────────

/// One of the three operator-controlled switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeFlag {
    /// Sampling and classification running.
    Capture,
    /// Audible tone during alerts.
    Tone,
    /// Console statistics and announcements.
    Reporting,
}

/// The three mode flags. All start enabled.
pub struct ModeFlags {
    capture: AtomicBool,
    tone: AtomicBool,
    reporting: AtomicBool,
}

impl ModeFlags {
    /// All flags enabled.
    pub const fn new() -> Self {
        ModeFlags {
            capture: AtomicBool::new(true),
            tone: AtomicBool::new(true),
            reporting: AtomicBool::new(true),
        }
    }

    fn cell(&self, flag: ModeFlag) -> &AtomicBool {
        match flag {
            ModeFlag::Capture => &self.capture,
            ModeFlag::Tone => &self.tone,
            ModeFlag::Reporting => &self.reporting,
        }
    }

    /// Current value of `flag`.
    pub fn get(&self, flag: ModeFlag) -> bool {
        self.cell(flag).load(Ordering::Acquire)
    }

    /// Overwrite `flag`.
    pub fn set(&self, flag: ModeFlag, enabled: bool) {
        self.cell(flag).store(enabled, Ordering::Release);
    }

    /// Invert `flag` and return the new value.
    ///
    /// Only the flag's single writer may call this; the load/store pair is not
    /// atomic as a whole.
    pub fn toggle(&self, flag: ModeFlag) -> bool {
        let cell = self.cell(flag);
        let enabled = !cell.load(Ordering::Acquire);
        cell.store(enabled, Ordering::Release);
        enabled
    }

    pub fn capture_enabled(&self) -> bool {
        self.get(ModeFlag::Capture)
    }

    pub fn tone_enabled(&self) -> bool {
        self.get(ModeFlag::Tone)
    }

    pub fn reporting_enabled(&self) -> bool {
        self.get(ModeFlag::Reporting)
    }
}

impl Default for ModeFlags {
    fn default() -> Self {
        Self::new()
    }
}

// ── Rolling statistics ─────────────────────────────────────────────────────

/// Plain copy of the rolling statistics at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatsSnapshot {
    /// Largest window peak seen.
    pub max_peak: u32,
    /// Sum of the peaks of windows classified at the top level.
    pub sum_peaks: u32,
    /// Number of windows classified at the top level.
    pub count_peaks: u32,
    /// Sum of every sample's absolute deviation from silence.
    pub sum_amplitude: u64,
    /// Number of samples accumulated.
    pub count_samples: u32,
}

impl StatsSnapshot {
    /// Mean peak of the extreme windows, `None` when there were none.
    pub fn mean_peak(&self) -> Option<u32> {
        if self.count_peaks == 0 {
            None
        } else {
            Some(self.sum_peaks / self.count_peaks)
        }
    }

    /// Mean per-sample amplitude, `None` when no samples were taken.
    pub fn mean_amplitude(&self) -> Option<u32> {
        if self.count_samples == 0 {
            None
        } else {
            Some((self.sum_amplitude / self.count_samples as u64) as u32)
        }
    }

    /// `true` when every counter is zero.
    pub fn is_empty(&self) -> bool {
        *self == StatsSnapshot::default()
    }
}

/// Counters accumulated per classified window and reset by each report.
pub struct RollingStats {
    max_peak: AtomicU32,
    sum_peaks: AtomicU32,
    count_peaks: AtomicU32,
    sum_amplitude: AtomicU64,
    count_samples: AtomicU32,
}

impl RollingStats {
    pub const fn new() -> Self {
        RollingStats {
            max_peak: AtomicU32::new(0),
            sum_peaks: AtomicU32::new(0),
            count_peaks: AtomicU32::new(0),
            sum_amplitude: AtomicU64::new(0),
            count_samples: AtomicU32::new(0),
        }
    }

    /// Fold one window into the counters (completion ISR only).
    pub fn record_window(&self, summary: &WindowSummary, level: Level) {
        self.sum_amplitude
            .fetch_add(summary.sum as u64, Ordering::Relaxed);
        self.count_samples.fetch_add(summary.count, Ordering::Relaxed);
        self.max_peak.fetch_max(summary.peak as u32, Ordering::Relaxed);
        if level.is_max() {
            self.sum_peaks.fetch_add(summary.peak as u32, Ordering::Relaxed);
            self.count_peaks.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Read the counters without resetting them.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            max_peak: self.max_peak.load(Ordering::Relaxed),
            sum_peaks: self.sum_peaks.load(Ordering::Relaxed),
            count_peaks: self.count_peaks.load(Ordering::Relaxed),
            sum_amplitude: self.sum_amplitude.load(Ordering::Relaxed),
            count_samples: self.count_samples.load(Ordering::Relaxed),
        }
    }

    /// Read the counters and reset them to zero.
    ///
    /// Each field is swapped individually, so a window recorded concurrently
    /// may be split across two reports, but it is never lost.
    pub fn take(&self) -> StatsSnapshot {
        StatsSnapshot {
            max_peak: self.max_peak.swap(0, Ordering::Relaxed),
            sum_peaks: self.sum_peaks.swap(0, Ordering::Relaxed),
            count_peaks: self.count_peaks.swap(0, Ordering::Relaxed),
            sum_amplitude: self.sum_amplitude.swap(0, Ordering::Relaxed),
            count_samples: self.count_samples.swap(0, Ordering::Relaxed),
        }
    }
}

impl Default for RollingStats {
    fn default() -> Self {
        Self::new()
    }
}

// ── Shared state ───────────────────────────────────────────────────────────

/// Everything the interrupt handlers and the main loop share.
///
/// ```ignore
/// static SHARED: SharedState = SharedState::new();
/// ```
pub struct SharedState {
    /// Operator switches.
    pub modes: ModeFlags,
    /// Counters read by the periodic report.
    pub stats: RollingStats,
    history: [AtomicU8; HISTORY_LEN],
    extreme_events: AtomicU32,
}

impl SharedState {
    #[allow(clippy::declare_interior_mut_const)]
    pub const fn new() -> Self {
        const SILENT: AtomicU8 = AtomicU8::new(0);
        SharedState {
            modes: ModeFlags::new(),
            stats: RollingStats::new(),
            history: [SILENT; HISTORY_LEN],
            extreme_events: AtomicU32::new(0),
        }
    }

    /// Publish the classifier's history for the main loop.
    pub fn publish_history(&self, history: &LevelHistory) {
        for (cell, level) in self.history.iter().zip(history.iter()) {
            cell.store(level.get(), Ordering::Relaxed);
        }
    }

    /// Last published history. May mix two publications if read mid-update.
    pub fn history_snapshot(&self) -> LevelHistory {
        let mut levels = [Level::SILENT; HISTORY_LEN];
        for (level, cell) in levels.iter_mut().zip(self.history.iter()) {
            *level = Level::saturating(cell.load(Ordering::Relaxed));
        }
        LevelHistory::from_levels(levels)
    }

    /// Count one extreme event and return the new total.
    pub fn record_extreme_event(&self) -> u32 {
        self.extreme_events
            .fetch_add(1, Ordering::Relaxed)
            .wrapping_add(1)
    }

    /// Extreme events since the last alert.
    pub fn extreme_events(&self) -> u32 {
        self.extreme_events.load(Ordering::Relaxed)
    }

    /// Reset the extreme event counter if it has reached `threshold`.
    ///
    /// The check and the reset are one atomic update, so an event recorded
    /// concurrently either lands before the reset or counts toward the next
    /// alert. Returns `true` when the counter was reset.
    pub fn take_extreme_events(&self, threshold: u32) -> bool {
        self.extreme_events
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                (n >= threshold).then_some(0)
            })
            .is_ok()
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(peak: u16, sum: u32, count: u32) -> WindowSummary {
        WindowSummary { peak, sum, count }
    }

    #[test]
    fn flags_start_enabled() {
        let flags = ModeFlags::new();
        assert!(flags.capture_enabled());
        assert!(flags.tone_enabled());
        assert!(flags.reporting_enabled());
    }

    #[test]
    fn toggle_returns_new_value() {
        let flags = ModeFlags::new();
        assert!(!flags.toggle(ModeFlag::Tone));
        assert!(!flags.tone_enabled());
        assert!(flags.capture_enabled());
        assert!(flags.toggle(ModeFlag::Tone));
        assert!(flags.tone_enabled());
    }

    #[test]
    fn stats_accumulate_and_take_resets() {
        let stats = RollingStats::new();
        stats.record_window(&window(120, 4000, 79), Level::saturating(1));
        stats.record_window(&window(800, 30000, 79), Level::MAX);

        let snap = stats.take();
        assert_eq!(snap.max_peak, 800);
        assert_eq!(snap.sum_peaks, 800);
        assert_eq!(snap.count_peaks, 1);
        assert_eq!(snap.sum_amplitude, 34000);
        assert_eq!(snap.count_samples, 158);

        assert!(stats.snapshot().is_empty());
    }

    #[test]
    fn means_guard_zero_counts() {
        let empty = StatsSnapshot::default();
        assert_eq!(empty.mean_peak(), None);
        assert_eq!(empty.mean_amplitude(), None);

        let snap = StatsSnapshot {
            max_peak: 900,
            sum_peaks: 1700,
            count_peaks: 2,
            sum_amplitude: 1000,
            count_samples: 8,
        };
        assert_eq!(snap.mean_peak(), Some(850));
        assert_eq!(snap.mean_amplitude(), Some(125));
    }

    #[test]
    fn extreme_events_reset_only_at_threshold() {
        let shared = SharedState::new();
        for _ in 0..19 {
            shared.record_extreme_event();
        }
        assert!(!shared.take_extreme_events(20));
        assert_eq!(shared.extreme_events(), 19);

        assert_eq!(shared.record_extreme_event(), 20);
        assert!(shared.take_extreme_events(20));
        assert_eq!(shared.extreme_events(), 0);
    }

    #[test]
    fn events_after_reset_count_toward_next_alert() {
        let shared = SharedState::new();
        for _ in 0..25 {
            shared.record_extreme_event();
        }
        assert!(shared.take_extreme_events(20));
        assert!(!shared.take_extreme_events(20));

        for _ in 0..3 {
            shared.record_extreme_event();
        }
        assert_eq!(shared.extreme_events(), 3);
        assert!(!shared.take_extreme_events(20));
        assert_eq!(shared.extreme_events(), 3);
    }

    #[test]
    fn concurrent_recording_is_never_lost_below_threshold() {
        let shared = std::sync::Arc::new(SharedState::new());
        let recorder = {
            let shared = shared.clone();
            std::thread::spawn(move || {
                for _ in 0..10_000 {
                    shared.record_extreme_event();
                }
            })
        };
        // Never reaches the threshold, so every check leaves the count alone.
        for _ in 0..10_000 {
            assert!(!shared.take_extreme_events(u32::MAX));
        }
        recorder.join().unwrap();
        assert_eq!(shared.extreme_events(), 10_000);
    }

    #[test]
    fn history_publish_roundtrip() {
        let shared = SharedState::new();
        let mut history = LevelHistory::new();
        history.push(Level::saturating(3));
        history.push(Level::MAX);
        shared.publish_history(&history);
        assert_eq!(shared.history_snapshot(), history);
    }
}
