//! Game configuration with defaults and validation
//!
//! Loaded once at startup and handed to the session registry.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::board::ColumnRange;
use crate::shared::AppError;

/// Env var naming a JSON config file
pub const CONFIG_PATH_ENV: &str = "LOTTO_CONFIG";
pub const DRAW_INTERVAL_ENV: &str = "LOTTO_DRAW_INTERVAL_MS";
pub const MAX_NUMBER_ENV: &str = "LOTTO_MAX_NUMBER";

/// A column may hold at most the drawable numbers plus one band of ten
const COLUMN_SLACK: usize = 10;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed wait between two draws
    pub draw_interval_ms: u64,
    /// Numbers 1..=max_number are drawn
    pub max_number: u32,
    /// Upper bound on waiting for a cancelled draw task to finish
    pub handoff_timeout_ms: u64,
    /// Minimum length of a player's chat handle
    pub min_handle_len: usize,
    pub board: BoardConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            draw_interval_ms: 10_000,
            max_number: 70,
            handoff_timeout_ms: 2_000,
            min_handle_len: 5,
            board: BoardConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoardConfig {
    pub rows: usize,
    pub cols: usize,
    /// Number of non-blank cells in every row
    pub cells_per_row: usize,
    /// One inclusive value range per column; empty means decade bands
    pub column_ranges: Vec<ColumnRange>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: 9,
            cols: 7,
            cells_per_row: 4,
            column_ranges: Vec::new(),
        }
    }
}

impl BoardConfig {
    /// The configured ranges, or decade bands when none are configured
    pub fn ranges(&self) -> Vec<ColumnRange> {
        if self.column_ranges.is_empty() {
            ColumnRange::decade_bands(self.cols)
        } else {
            self.column_ranges.clone()
        }
    }

    pub fn validate(&self, max_number: u32) -> Result<(), AppError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(invalid("board must have at least one row and one column"));
        }
        if self.cells_per_row == 0 {
            return Err(invalid("cells_per_row must be > 0"));
        }
        if self.cells_per_row > self.cols {
            return Err(invalid(format!(
                "cells_per_row ({}) exceeds cols ({})",
                self.cells_per_row, self.cols
            )));
        }

        let mut ranges = self.ranges();
        if ranges.len() != self.cols {
            return Err(invalid(format!(
                "expected {} column ranges, got {}",
                self.cols,
                ranges.len()
            )));
        }

        for range in &ranges {
            if range.min == 0 || range.min > range.max {
                return Err(invalid(format!("column range {} is empty", range)));
            }
            if range.len() > max_number as usize + COLUMN_SLACK {
                return Err(invalid(format!(
                    "column range {} is wider than the drawable numbers 1..={}",
                    range, max_number
                )));
            }
            // every row may place a value in the same column
            if range.len() < self.rows {
                return Err(invalid(format!(
                    "column range {} holds fewer than {} values",
                    range, self.rows
                )));
            }
        }

        ranges.sort_by_key(|r| r.min);
        for pair in ranges.windows(2) {
            if pair[0].max >= pair[1].min {
                return Err(invalid(format!(
                    "column ranges {} and {} overlap",
                    pair[0], pair[1]
                )));
            }
        }

        // widened so a range ending at u32::MAX cannot overflow
        let max_number = u64::from(max_number);
        let mut next: u64 = 1;
        for range in &ranges {
            if next > max_number {
                break;
            }
            if u64::from(range.min) > next {
                return Err(invalid(format!(
                    "column ranges do not cover {}..={}: {} is missing",
                    1, max_number, next
                )));
            }
            next = u64::from(range.max) + 1;
        }
        if next <= max_number {
            return Err(invalid(format!(
                "column ranges stop before max_number {}",
                max_number
            )));
        }

        Ok(())
    }
}

impl GameConfig {
    pub fn draw_interval(&self) -> Duration {
        Duration::from_millis(self.draw_interval_ms)
    }

    pub fn handoff_timeout(&self) -> Duration {
        Duration::from_millis(self.handoff_timeout_ms)
    }

    /// Validate configuration for logical consistency
    pub fn validate(&self) -> Result<(), AppError> {
        if self.draw_interval_ms == 0 {
            return Err(invalid("draw_interval_ms must be > 0"));
        }
        if self.max_number < 1 {
            return Err(invalid("max_number must be >= 1"));
        }
        self.board.validate(self.max_number)
    }

    /// Parse a JSON document; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json).map_err(|e| invalid(format!("malformed config: {}", e)))
    }

    /// Load from `LOTTO_CONFIG` (if set), apply env overrides, then validate
    pub fn load() -> Result<Self, AppError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                info!(path = %path, "Loading game config file");
                let raw = std::fs::read_to_string(&path)
                    .map_err(|e| invalid(format!("cannot read {}: {}", path, e)))?;
                Self::from_json(&raw)?
            }
            Err(_) => {
                debug!("No config file set, using defaults");
                Self::default()
            }
        };

        if let Some(interval) = env_number::<u64>(DRAW_INTERVAL_ENV)? {
            config.draw_interval_ms = interval;
        }
        if let Some(max_number) = env_number::<u32>(MAX_NUMBER_ENV)? {
            config.max_number = max_number;
        }

        config.validate()?;
        Ok(config)
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Result<Option<T>, AppError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(format!("{} is not a number: {}", key, raw))),
        Err(_) => Ok(None),
    }
}

fn invalid(msg: impl Into<String>) -> AppError {
    AppError::InvalidConfiguration(msg.into())
}
