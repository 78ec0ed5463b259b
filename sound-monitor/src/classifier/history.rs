//! Fixed-length FIFO of recent levels.

use core::slice;

use super::level::Level;
use crate::constants::HISTORY_LEN;

/// The last [`HISTORY_LEN`] rendered levels.
///
/// Index 0 is the oldest entry (leftmost matrix column) and index
/// `HISTORY_LEN - 1` the newest. Each [`push`](Self::push) shifts every entry
/// one slot toward index 0 and evicts the oldest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LevelHistory {
    levels: [Level; HISTORY_LEN],
}

impl LevelHistory {
    /// All-silent history.
    pub const fn new() -> Self {
        LevelHistory {
            levels: [Level::SILENT; HISTORY_LEN],
        }
    }

    pub const fn from_levels(levels: [Level; HISTORY_LEN]) -> Self {
        LevelHistory { levels }
    }

    /// Insert `level` as the newest entry and return the evicted oldest one.
    pub fn push(&mut self, level: Level) -> Level {
        let evicted = self.levels[0];
        self.levels.copy_within(1.., 0);
        self.levels[HISTORY_LEN - 1] = level;
        evicted
    }

    pub fn newest(&self) -> Level {
        self.levels[HISTORY_LEN - 1]
    }

    pub fn oldest(&self) -> Level {
        self.levels[0]
    }

    pub fn levels(&self) -> &[Level; HISTORY_LEN] {
        &self.levels
    }

    /// Oldest to newest.
    pub fn iter(&self) -> slice::Iter<'_, Level> {
        self.levels.iter()
    }

    pub fn clear(&mut self) {
        self.levels = [Level::SILENT; HISTORY_LEN];
    }
}

impl<'a> IntoIterator for &'a LevelHistory {
    type Item = &'a Level;
    type IntoIter = slice::Iter<'a, Level>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(values: [u8; HISTORY_LEN]) -> [Level; HISTORY_LEN] {
        values.map(Level::saturating)
    }

    #[test]
    fn starts_silent() {
        let history = LevelHistory::new();
        assert!(history.iter().all(|&l| l == Level::SILENT));
        assert_eq!(history.levels().len(), HISTORY_LEN);
    }

    #[test]
    fn fifo_eviction() {
        let mut history = LevelHistory::new();
        for v in [1, 2, 3, 4, 5, 0] {
            history.push(Level::saturating(v));
        }
        // [a..f] into an empty history leaves [b..f]
        assert_eq!(*history.levels(), levels([2, 3, 4, 5, 0]));
        assert_eq!(history.newest(), Level::SILENT);
        assert_eq!(history.oldest(), Level::saturating(2));
    }

    #[test]
    fn push_returns_evicted() {
        let mut history = LevelHistory::from_levels(levels([5, 4, 3, 2, 1]));
        assert_eq!(history.push(Level::SILENT), Level::MAX);
        assert_eq!(history.push(Level::SILENT), Level::saturating(4));
        assert_eq!(*history.levels(), levels([3, 2, 1, 0, 0]));
    }

    #[test]
    fn clear_resets() {
        let mut history = LevelHistory::from_levels(levels([1, 1, 1, 1, 1]));
        history.clear();
        assert_eq!(history, LevelHistory::new());
    }
}
