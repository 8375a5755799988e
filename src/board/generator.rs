use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::models::{Board, Cell, ColumnRange};
use crate::config::BoardConfig;
use crate::shared::AppError;

/// Produces randomized player boards for one session.
///
/// Owns a single generator seeded once from the OS and reuses it for
/// every board, so rapid registrations never share a seed.
pub struct BoardGenerator {
    config: BoardConfig,
    ranges: Vec<ColumnRange>,
    rng: StdRng,
}

impl BoardGenerator {
    pub fn new(config: BoardConfig, max_number: u32) -> Result<Self, AppError> {
        Self::with_rng(config, max_number, StdRng::from_os_rng())
    }

    /// Same as `new` with a caller-provided generator (deterministic in tests)
    pub fn with_rng(config: BoardConfig, max_number: u32, rng: StdRng) -> Result<Self, AppError> {
        config.validate(max_number)?;
        let ranges = config.ranges();
        Ok(Self {
            config,
            ranges,
            rng,
        })
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn generate(&mut self) -> Board {
        let board = generate_board(&self.config, &self.ranges, &mut self.rng);
        debug!(
            rows = board.rows(),
            cols = board.cols(),
            numbers = board.numbers().count(),
            "Generated board"
        );
        board
    }
}

/// Fills a blank grid in two passes: pick which cells of each row get a
/// number, then assign each column's picks from that column's range
/// without replacement.
fn generate_board<R: Rng + ?Sized>(
    config: &BoardConfig,
    ranges: &[ColumnRange],
    rng: &mut R,
) -> Board {
    let mut board = Board::blank(config.rows, config.cols);
    let mut pending = vec![vec![false; config.cols]; config.rows];

    for row in pending.iter_mut() {
        for col in pick_columns(rng, config.cols, config.cells_per_row) {
            row[col] = true;
        }
    }

    for (col, range) in ranges.iter().enumerate() {
        let mut values = range.values();

        for row in 0..config.rows {
            if !pending[row][col] {
                continue;
            }

            values.shuffle(rng);
            // validation guarantees a range has at least `rows` values
            if let Some(value) = values.pop() {
                board.set(row, col, Cell::Number(value));
            }
        }
    }

    board
}

/// Chooses `count` distinct column indices, redrawing on collision
fn pick_columns<R: Rng + ?Sized>(rng: &mut R, cols: usize, count: usize) -> Vec<usize> {
    let mut picked = Vec::with_capacity(count);
    while picked.len() < count {
        let col = rng.random_range(0..cols);
        if !picked.contains(&col) {
            picked.push(col);
        }
    }
    picked
}
