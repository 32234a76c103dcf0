//! DuckDB query execution for table reconciliation
//!
//! Wraps a single `duckdb::Connection` and exposes the handful of query
//! shapes the reconciliation engine needs: catalog lookups, scalar counts,
//! and row queries returning values addressable by column name. A
//! connection is not thread-safe; use one engine per concurrent comparison.

use crate::error::Result;
use duckdb::types::ValueRef;
use duckdb::Connection;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A single result row, keyed by column name in select-list order.
pub type TabularRow = IndexMap<String, ScalarValue>;

/// Dynamically typed cell value decoded from a DuckDB result.
///
/// Timestamps, dates and other exotic types decode to their textual
/// rendering; equality on those is still meaningful for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Int(i) => Some(*i as f64),
            ScalarValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn from_value_ref(value: ValueRef<'_>) -> ScalarValue {
        match value {
            ValueRef::Null => ScalarValue::Null,
            ValueRef::Boolean(b) => ScalarValue::Bool(b),
            ValueRef::TinyInt(i) => ScalarValue::Int(i as i64),
            ValueRef::SmallInt(i) => ScalarValue::Int(i as i64),
            ValueRef::Int(i) => ScalarValue::Int(i as i64),
            ValueRef::BigInt(i) => ScalarValue::Int(i),
            ValueRef::HugeInt(i) => {
                if let Ok(v) = i64::try_from(i) {
                    ScalarValue::Int(v)
                } else {
                    ScalarValue::Float(i as f64)
                }
            }
            ValueRef::UTinyInt(i) => ScalarValue::Int(i as i64),
            ValueRef::USmallInt(i) => ScalarValue::Int(i as i64),
            ValueRef::UInt(i) => ScalarValue::Int(i as i64),
            ValueRef::UBigInt(i) => {
                if let Ok(v) = i64::try_from(i) {
                    ScalarValue::Int(v)
                } else {
                    ScalarValue::Float(i as f64)
                }
            }
            ValueRef::Float(f) => ScalarValue::Float(f as f64),
            ValueRef::Double(f) => ScalarValue::Float(f),
            ValueRef::Decimal(d) => {
                let text = d.to_string();
                match text.parse::<f64>() {
                    Ok(f) => ScalarValue::Float(f),
                    Err(_) => ScalarValue::Text(text),
                }
            }
            ValueRef::Text(s) => ScalarValue::Text(String::from_utf8_lossy(s).to_string()),
            ValueRef::Blob(b) => ScalarValue::Text(format!("<blob:{} bytes>", b.len())),
            other => ScalarValue::Text(format!("{:?}", other)),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "NULL"),
            ScalarValue::Bool(b) => write!(f, "{}", b),
            ScalarValue::Int(i) => write!(f, "{}", i),
            ScalarValue::Float(v) => write!(f, "{}", v),
            ScalarValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Query executor backed by a single DuckDB connection.
pub struct DuckDbEngine {
    connection: Connection,
}

impl DuckDbEngine {
    /// Open an in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        Ok(Self { connection })
    }

    /// Open a database file, creating it if necessary.
    pub fn open(database_path: &Path) -> Result<Self> {
        let connection = Connection::open(database_path)?;
        Ok(Self { connection })
    }

    /// Execute a single statement that returns no rows.
    pub fn execute(&self, sql: &str) -> Result<usize> {
        log::debug!("executing statement: {}", sql);
        Ok(self.connection.execute(sql, [])?)
    }

    /// Execute a batch of semicolon-separated statements.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.connection.execute_batch(sql)?;
        Ok(())
    }

    /// Execute a query expected to return a single non-negative integer,
    /// such as `SELECT COUNT(*) ...`.
    pub fn count(&self, sql: &str) -> Result<u64> {
        log::debug!("executing count query: {}", sql);
        let mut stmt = self.connection.prepare(sql)?;
        let n: i64 = stmt.query_row([], |row| row.get(0))?;
        Ok(n.max(0) as u64)
    }

    /// Execute a query and collect every row, keyed by column name.
    pub fn query_rows(&self, sql: &str) -> Result<Vec<TabularRow>> {
        log::debug!("executing query: {}", sql);
        let mut stmt = self.connection.prepare(sql)?;
        let mut rows = stmt.query([])?;

        let mut names: Vec<String> = Vec::new();
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            if names.is_empty() {
                let statement: &duckdb::Statement<'_> = row.as_ref();
                names = statement
                    .column_names()
                    .into_iter()
                    .map(|n| n.to_string())
                    .collect();
            }
            let mut decoded = IndexMap::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                let value = ScalarValue::from_value_ref(row.get_ref(i)?);
                decoded.insert(name.clone(), value);
            }
            out.push(decoded);
        }

        Ok(out)
    }

    /// Execute a query expected to return exactly one row.
    pub fn query_single_row(&self, sql: &str) -> Result<TabularRow> {
        let mut rows = self.query_rows(sql)?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            n => Err(crate::error::TabreconError::data_processing(format!(
                "expected exactly one result row, got {}",
                n
            ))),
        }
    }
}
