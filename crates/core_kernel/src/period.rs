//! Liquidation period temporal types
//!
//! Cash-out payments are scheduled inside a recurring settlement window.
//! The window is a half-open interval `[start, end)` in UTC.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to liquidation windows
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Invalid period: start {start} must be before end {end}")]
    InvalidWindow { start: String, end: String },
}

/// The settlement window a cash-out batch belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationPeriod {
    /// Start of the window (inclusive)
    pub start: DateTime<Utc>,
    /// End of the window (exclusive)
    pub end: DateTime<Utc>,
}

impl LiquidationPeriod {
    /// Creates a new window, validating ordering
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, PeriodError> {
        if start >= end {
            return Err(PeriodError::InvalidWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// A window of `days` days starting at `start`
    pub fn of_days(start: DateTime<Utc>, days: i64) -> Result<Self, PeriodError> {
        Self::new(start, start + Duration::days(days))
    }

    /// Returns true if the timestamp falls inside the window
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }

    /// The window immediately following this one, with the same length
    pub fn next(&self) -> Self {
        let length = self.end - self.start;
        Self {
            start: self.end,
            end: self.end + length,
        }
    }
}
