//! Discrete loudness levels.

use crate::constants::{LEVEL_BOUNDARIES, MAX_LEVEL};

/// Bucketed loudness, `0..=MAX_LEVEL`. Level 0 is silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Level(u8);

impl Level {
    /// Below the first boundary.
    pub const SILENT: Level = Level(0);

    /// At or above the last boundary.
    pub const MAX: Level = Level(MAX_LEVEL);

    /// `None` if `value` is above [`Level::MAX`].
    pub const fn new(value: u8) -> Option<Self> {
        if value <= MAX_LEVEL {
            Some(Level(value))
        } else {
            None
        }
    }

    /// Clamp `value` into the valid range.
    pub const fn saturating(value: u8) -> Self {
        if value > MAX_LEVEL {
            Level::MAX
        } else {
            Level(value)
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// `true` for the top bucket (an extreme event).
    pub const fn is_max(self) -> bool {
        self.0 == MAX_LEVEL
    }
}

/// Bucket `amplitude` against ascending `boundaries`.
///
/// The level is the number of leading boundaries the amplitude reaches, so
/// each boundary is inclusive on its upper side: with the default table
/// `99 → 0`, `100 → 1`, `249 → 1`, `250 → 2`, `750 → 5`.
pub fn classify(amplitude: u16, boundaries: &[u16]) -> Level {
    let reached = boundaries.iter().take_while(|&&b| amplitude >= b).count();
    Level::saturating(reached as u8)
}

/// [`classify`] with [`LEVEL_BOUNDARIES`].
pub fn classify_default(amplitude: u16) -> Level {
    classify(amplitude, &LEVEL_BOUNDARIES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_values() {
        let cases = [
            (0, 0),
            (99, 0),
            (100, 1),
            (249, 1),
            (250, 2),
            (349, 2),
            (350, 3),
            (449, 3),
            (450, 4),
            (749, 4),
            (750, 5),
            (u16::MAX, 5),
        ];
        for (amplitude, expected) in cases {
            assert_eq!(
                classify_default(amplitude).get(),
                expected,
                "amplitude {amplitude}"
            );
        }
    }

    #[test]
    fn monotonic_in_amplitude() {
        let mut previous = Level::SILENT;
        for amplitude in 0..=2048u16 {
            let level = classify_default(amplitude);
            assert!(level >= previous, "level dropped at {amplitude}");
            previous = level;
        }
        assert_eq!(previous, Level::MAX);
    }

    #[test]
    fn other_tables() {
        let table = [50, 100, 200, 1635];
        assert_eq!(classify(49, &table).get(), 0);
        assert_eq!(classify(150, &table).get(), 2);
        assert_eq!(classify(2000, &table).get(), 4);
        assert_eq!(classify(10, &[]), Level::SILENT);
    }

    #[test]
    fn constructors() {
        assert_eq!(Level::new(5), Some(Level::MAX));
        assert_eq!(Level::new(6), None);
        assert_eq!(Level::saturating(200), Level::MAX);
        assert!(Level::MAX.is_max());
        assert!(!Level::saturating(4).is_max());
    }
}
