//! # tabrecon
//!
//! A tolerance-based tabular reconciliation engine for DuckDB: given two
//! tables expected to represent the same logical dataset produced by two
//! different pipelines, determine whether they are equivalent within
//! configurable tolerances, and if not, explain exactly where and how they
//! differ.

pub mod classify;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod population;
pub mod predicate;
pub mod report;
pub mod result;
pub mod sample;

pub use classify::{ColumnKind, DuckDbTypeClassifier, TypeClassifier};
pub use compare::TableComparator;
pub use config::ComparisonConfig;
pub use engine::{DuckDbEngine, ScalarValue};
pub use error::{Result, TabreconError};
pub use metadata::{ColumnMetadata, TableRef};
pub use report::ReconReporter;
pub use result::{ComparisonResult, FailedRowSample, ValueDiff, Verdict};

/// Default relative tolerance for numeric comparisons
pub const DEFAULT_VALUE_TOLERANCE: f64 = 0.05;

/// Default maximum fraction of failing or missing rows
pub const DEFAULT_ROW_TOLERANCE: f64 = 0.05;

/// Number of failing rows or missing keys retained as evidence
pub const DEFAULT_SAMPLE_LIMIT: usize = 5;
