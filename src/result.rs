//! Comparison result model
//!
//! `ComparisonResult` is the only entity handed to external consumers; it
//! carries enough structured data to render a human-readable diff report
//! without re-querying the data engine. All entities are created fresh per
//! comparison and immutable after construction.

use crate::engine::ScalarValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Terminal state of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Passed,
    /// Too many joined rows failed their column predicates.
    FailedOnValues,
    /// Row-count divergence exceeded tolerance; value comparison was skipped.
    FailedOnPopulation,
}

/// Source/target pair for one failed column, with numeric deltas when both
/// sides are numeric.
///
/// `diff_pct` is `+inf` when the source value is exactly zero. JSON export
/// renders non-finite floats as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueDiff {
    pub source: ScalarValue,
    pub target: ScalarValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_pct: Option<f64>,
}

impl ValueDiff {
    /// Pair up a source and target value, deriving deltas when both are
    /// numeric.
    pub fn new(source: ScalarValue, target: ScalarValue) -> Self {
        let (diff, diff_pct) = match (source.as_f64(), target.as_f64()) {
            (Some(s), Some(t)) => {
                let diff = t - s;
                let diff_pct = if s == 0.0 {
                    f64::INFINITY
                } else {
                    diff / s * 100.0
                };
                (Some(diff), Some(diff_pct))
            }
            _ => (None, None),
        };

        Self {
            source,
            target,
            diff,
            diff_pct,
        }
    }
}

/// One concrete failing row, for diagnostics only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedRowSample {
    /// Primary-key values identifying the row.
    pub primary_key: IndexMap<String, ScalarValue>,
    /// Columns whose individual predicate failed for this row.
    pub failed_columns: Vec<String>,
    /// Source/target values per failed column.
    pub value_differences: IndexMap<String, ValueDiff>,
    /// Set when the row exists in one table only: the qualified name of the
    /// table it is missing from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_from: Option<String>,
}

impl FailedRowSample {
    /// Sample for a key present in one table but absent from the other.
    pub fn missing(primary_key: IndexMap<String, ScalarValue>, missing_from: String) -> Self {
        Self {
            primary_key,
            failed_columns: Vec::new(),
            value_differences: IndexMap::new(),
            missing_from: Some(missing_from),
        }
    }
}

/// Outcome of comparing one table pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Qualified name of the source table.
    pub source_table: String,
    /// Qualified name of the target table.
    pub target_table: String,
    /// Overall verdict: true iff `verdict == Verdict::Passed`.
    pub passed: bool,
    pub verdict: Verdict,
    /// Population size the failure fraction is relative to: the joined row
    /// count, or the larger table count on a population failure.
    pub total_rows: u64,
    /// Fraction of rows that failed, in [0, 1].
    pub failed_row_fraction: f64,
    /// Per-column failure counts; only columns with count > 0 appear.
    pub failed_columns: IndexMap<String, u64>,
    /// Bounded, deterministically ordered failing-row diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_failed_rows: Option<Vec<FailedRowSample>>,
    /// Echoed for audit.
    pub value_tolerance: f64,
    /// Echoed for audit.
    pub row_tolerance: f64,
    /// The executable comparison query, kept for reproducibility.
    pub diagnostic_query: String,
}

impl ComparisonResult {
    /// Approximate count of failing rows implied by the fraction.
    pub fn failed_rows(&self) -> u64 {
        (self.failed_row_fraction * self.total_rows as f64).round() as u64
    }
}
