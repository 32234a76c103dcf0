//! Per-comparison configuration
//!
//! All tolerances, key choices and exclusions are supplied explicitly per
//! call; no process-wide state persists between comparisons.

use crate::error::{Result, TabreconError};
use crate::metadata::ColumnMetadata;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_ROW_TOLERANCE, DEFAULT_VALUE_TOLERANCE};

/// Configuration for a single table comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// Ordered, non-empty set of columns that uniquely identify a row.
    /// Must exist in both tables.
    pub primary_key: Vec<String>,
    /// Relative slack for numeric comparisons (0.05 = 5%).
    pub value_tolerance: f64,
    /// Maximum fraction of failing or missing rows before the comparison
    /// fails overall.
    pub row_tolerance: f64,
    /// Columns removed from comparison regardless of type.
    pub exclude_columns: Vec<String>,
    /// Closed datetime interval in which timestamp mismatches are treated
    /// as equal on either side (a known-safe cutover window).
    pub timestamp_exclude_range: Option<(NaiveDateTime, NaiveDateTime)>,
    /// Strip leading/trailing whitespace before string equality.
    pub trim_strings: bool,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            primary_key: Vec::new(),
            value_tolerance: DEFAULT_VALUE_TOLERANCE,
            row_tolerance: DEFAULT_ROW_TOLERANCE,
            exclude_columns: Vec::new(),
            timestamp_exclude_range: None,
            trim_strings: false,
        }
    }
}

impl ComparisonConfig {
    /// Create a configuration with default tolerances for the given key.
    pub fn new(primary_key: Vec<String>) -> Self {
        Self {
            primary_key,
            ..Self::default()
        }
    }

    /// Check structural validity before any query executes.
    pub fn validate(&self) -> Result<()> {
        if self.primary_key.is_empty() {
            return Err(TabreconError::config("primary key must not be empty"));
        }
        if !self.value_tolerance.is_finite() || self.value_tolerance < 0.0 {
            return Err(TabreconError::config(format!(
                "value_tolerance must be a non-negative number, got {}",
                self.value_tolerance
            )));
        }
        if !self.row_tolerance.is_finite() || !(0.0..=1.0).contains(&self.row_tolerance) {
            return Err(TabreconError::config(format!(
                "row_tolerance must be within [0, 1], got {}",
                self.row_tolerance
            )));
        }
        if let Some((start, end)) = &self.timestamp_exclude_range {
            if start > end {
                return Err(TabreconError::config(format!(
                    "timestamp_exclude_range start {} is after end {}",
                    start, end
                )));
            }
        }
        Ok(())
    }

    /// Check that every primary-key column exists in both tables.
    pub fn validate_primary_key(
        &self,
        source: &ColumnMetadata,
        target: &ColumnMetadata,
    ) -> Result<()> {
        for key in &self.primary_key {
            if !source.contains_key(key) || !target.contains_key(key) {
                return Err(TabreconError::config(format!(
                    "primary key column '{}' is missing from one or both tables",
                    key
                )));
            }
        }
        Ok(())
    }
}
