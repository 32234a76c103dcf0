//! Column type classification for comparison dispatch
//!
//! Declared type strings are engine-specific vocabularies, so classification
//! is a case-insensitive substring match against known families. Anything
//! unmatched is compared by strict equality rather than excluded. Porting
//! the engine to a new catalog means supplying one `TypeClassifier` impl.

use serde::{Deserialize, Serialize};

/// Closed set of comparison strategies a column can be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Exact equality, with an optional exclusion window.
    Timestamp,
    /// Relative-tolerance comparison.
    Numeric,
    /// Equality with optional whitespace trimming.
    String,
    /// Strict equality with null-equals-null semantics.
    Exact,
}

/// Maps a declared column type to a comparison strategy.
///
/// Only the source side's declared type drives classification; when the two
/// tables disagree on a column's family the source wins. This asymmetry is
/// deliberate and documented rather than silently resolved.
pub trait TypeClassifier {
    fn classify(&self, declared_type: &str) -> ColumnKind;
}

const TIMESTAMP_FAMILY: &[&str] = &["timestamp"];

const NUMERIC_FAMILY: &[&str] = &[
    "number", "decimal", "numeric", "float", "int", "double", "real",
];

const STRING_FAMILY: &[&str] = &["string", "varchar", "char", "text"];

/// Default classifier for DuckDB's type vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDbTypeClassifier;

impl TypeClassifier for DuckDbTypeClassifier {
    fn classify(&self, declared_type: &str) -> ColumnKind {
        let lowered = declared_type.to_lowercase();

        if TIMESTAMP_FAMILY.iter().any(|t| lowered.contains(t)) {
            ColumnKind::Timestamp
        } else if NUMERIC_FAMILY.iter().any(|t| lowered.contains(t)) {
            ColumnKind::Numeric
        } else if STRING_FAMILY.iter().any(|t| lowered.contains(t)) {
            ColumnKind::String
        } else {
            ColumnKind::Exact
        }
    }
}
