use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::AppError;

/// A single cell on a player's board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    /// Not part of the game
    Blank,
    /// A value assigned at generation time, never changes
    Number(u32),
    /// Player-toggled marker on a blank cell
    Checked,
}

/// Inclusive range of values that may appear in one board column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRange {
    pub min: u32,
    pub max: u32,
}

impl ColumnRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn len(&self) -> usize {
        if self.max < self.min {
            0
        } else {
            (self.max - self.min) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn values(&self) -> Vec<u32> {
        (self.min..=self.max).collect()
    }

    /// Column 0 holds 1-9, column i holds 10i..=10i+9, and the last column
    /// also takes the round number that follows (e.g. 80-90 on a 9-column board)
    pub fn decade_bands(cols: usize) -> Vec<Self> {
        (0..cols)
            .map(|i| {
                let base = (i * 10) as u32;
                if i == 0 {
                    Self::new(1, 9)
                } else if i == cols - 1 {
                    Self::new(base, base + 10)
                } else {
                    Self::new(base, base + 9)
                }
            })
            .collect()
    }
}

impl fmt::Display for ColumnRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Fixed-size grid of cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<Cell>>,
}

impl Board {
    pub fn blank(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![vec![Cell::Blank; cols]; rows],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn grid(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row][col] = cell;
    }

    /// Flips a blank cell to checked and back. Number cells are left alone.
    /// Returns whether the board changed.
    pub fn toggle(&mut self, row: usize, col: usize) -> Result<bool, AppError> {
        let cell = self
            .cells
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(AppError::OutOfBounds { row, col })?;

        match *cell {
            Cell::Blank => *cell = Cell::Checked,
            Cell::Checked => *cell = Cell::Blank,
            Cell::Number(_) => return Ok(false),
        }
        Ok(true)
    }

    /// All assigned values, row by row
    pub fn numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.cells.iter().flatten().filter_map(|cell| match cell {
            Cell::Number(v) => Some(*v),
            _ => None,
        })
    }

    pub fn numbers_in_row(&self, row: usize) -> usize {
        self.cells
            .get(row)
            .map(|r| r.iter().filter(|c| matches!(c, Cell::Number(_))).count())
            .unwrap_or(0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Cell::Blank => "  ".to_string(),
                    Cell::Checked => " *".to_string(),
                    Cell::Number(v) => format!("{:>2}", v),
                })
                .collect();
            writeln!(f, "|{}|", line.join("|"))?;
        }
        Ok(())
    }
}
