//! Table references and catalog metadata resolution

use crate::engine::DuckDbEngine;
use crate::error::{Result, TabreconError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column name to declared type, in catalog order.
pub type ColumnMetadata = IndexMap<String, String>;

/// Qualified name of a queryable relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Parse a `schema.name` string; a bare name lands in the `main` schema.
    pub fn parse(qualified: &str) -> Self {
        match qualified.rsplit_once('.') {
            Some((schema, name)) => Self::new(schema, name),
            None => Self::new("main", qualified),
        }
    }

    /// Render the qualified name for use in query text.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Resolve column name/type pairs for a table from `information_schema`.
///
/// Fails when the table does not exist; catalog lookups are assumed fast
/// and deterministic, so there is no retry.
pub fn resolve_columns(engine: &DuckDbEngine, table: &TableRef) -> Result<ColumnMetadata> {
    let sql = format!(
        "SELECT column_name, data_type \
         FROM information_schema.columns \
         WHERE table_schema = '{}' AND table_name = '{}' \
         ORDER BY ordinal_position",
        table.schema, table.name
    );

    let rows = engine.query_rows(&sql)?;
    if rows.is_empty() {
        return Err(TabreconError::metadata(format!(
            "table not found in catalog: {}",
            table
        )));
    }

    let mut columns = ColumnMetadata::with_capacity(rows.len());
    for row in rows {
        let name = row
            .get("column_name")
            .map(|v| v.to_string())
            .unwrap_or_default();
        let data_type = row
            .get("data_type")
            .map(|v| v.to_string())
            .unwrap_or_default();
        columns.insert(name, data_type);
    }

    Ok(columns)
}

/// Intersect source and target column sets and drop exclusions.
///
/// Columns present on only one side are silently excluded rather than
/// errored. Source catalog order is preserved so downstream query text
/// and failure maps stay deterministic.
pub fn comparable_columns(
    source: &ColumnMetadata,
    target: &ColumnMetadata,
    exclude_columns: &[String],
) -> Vec<String> {
    source
        .keys()
        .filter(|name| target.contains_key(*name))
        .filter(|name| !exclude_columns.iter().any(|ex| ex == *name))
        .cloned()
        .collect()
}
