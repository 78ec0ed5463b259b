//! Periodic console statistics.

use core::fmt;

use crate::constants::{LEVEL_BOUNDARIES, REPORT_INTERVAL_MS};
use crate::state::StatsSnapshot;

/// One report's worth of statistics, ready to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub interval_ms: u32,
    pub stats: StatsSnapshot,
}

impl Report {
    pub const fn new(stats: StatsSnapshot) -> Self {
        Report {
            interval_ms: REPORT_INTERVAL_MS,
            stats,
        }
    }
}

/// Prints a mean or `no data` when nothing was accumulated.
struct OrNoData(Option<u32>);

impl fmt::Display for OrNoData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v}"),
            None => f.write_str("no data"),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let top = LEVEL_BOUNDARIES[LEVEL_BOUNDARIES.len() - 1];
        let s = &self.stats;
        writeln!(f)?;
        writeln!(f, "REPORT EVERY -- {}ms --:", self.interval_ms)?;
        writeln!(f, "Max amplitude -- {}", s.max_peak)?;
        writeln!(f, "Mean amplitude above {} -- {}", top, OrNoData(s.mean_peak()))?;
        writeln!(f, "Windows above {} -- {}", top, s.count_peaks)?;
        writeln!(f, "Mean amplitude -- {}", OrNoData(s.mean_amplitude()))?;
        writeln!(f, "Samples -- {}", s.count_samples)
    }
}
