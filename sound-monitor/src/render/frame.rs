//! Full-matrix frames built from the level history.

use core::ops::Index;

use super::color::{level_color, Rgb};
use crate::classifier::LevelHistory;
use crate::constants::{GRID_COLUMNS, GRID_ROWS, NUM_CELLS};

/// Physical cell index of each `[column][row]`, row 0 at the bottom.
///
/// The matrix is wired as a serpentine chain starting bottom-right, so
/// columns alternate direction.
pub const COLUMN_CELLS: [[u8; GRID_ROWS]; GRID_COLUMNS] = [
    [4, 5, 14, 15, 24],
    [3, 6, 13, 16, 23],
    [2, 7, 12, 17, 22],
    [1, 8, 11, 18, 21],
    [0, 9, 10, 19, 20],
];

/// One colour per cell, indexed in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    cells: [Rgb; NUM_CELLS],
}

impl Frame {
    /// All cells dark.
    pub const fn off() -> Self {
        Frame {
            cells: [Rgb::OFF; NUM_CELLS],
        }
    }

    /// Column `i` shows history slot `i` (oldest on the left), lit bottom-up
    /// to the slot's level.
    pub fn from_history(history: &LevelHistory) -> Self {
        let mut frame = Frame::off();
        for (column, level) in history.iter().enumerate() {
            let color = level_color(*level);
            let height = (level.get() as usize).min(GRID_ROWS);
            for &cell in &COLUMN_CELLS[column][..height] {
                frame.cells[cell as usize] = color;
            }
        }
        frame
    }

    /// Cells in chain order, as pushed to the matrix.
    pub fn cells(&self) -> &[Rgb; NUM_CELLS] {
        &self.cells
    }

    /// `(cell_index, colour)` for every lit cell.
    pub fn lit_cells(&self) -> impl Iterator<Item = (usize, Rgb)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_off())
            .map(|(i, &c)| (i, c))
    }

    pub fn is_off(&self) -> bool {
        self.cells.iter().all(|c| c.is_off())
    }
}

impl Default for Frame {
    fn default() -> Self {
        Frame::off()
    }
}

impl Index<usize> for Frame {
    type Output = Rgb;

    fn index(&self, index: usize) -> &Rgb {
        &self.cells[index]
    }
}
