//! Per-column equivalence predicate construction
//!
//! Builds a typed predicate tree (an AND over per-column equivalence nodes)
//! and renders it into DuckDB SQL. Keeping construction separate from
//! rendering means the comparison logic is not welded to one engine's
//! syntax: the nodes carry the column and strategy, the `sql` field is the
//! DuckDB rendering consumed by the join queries.
//!
//! Joined rows expose each compared column as `t1_<col>` (source) and
//! `t2_<col>` (target); every predicate is written against those aliases.

use crate::classify::{ColumnKind, TypeClassifier};
use crate::config::ComparisonConfig;
use crate::metadata::ColumnMetadata;
use chrono::NaiveDateTime;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Equivalence test for one column over the joined row aliases.
#[derive(Debug, Clone)]
pub struct ColumnPredicate {
    pub column: String,
    pub kind: ColumnKind,
    sql: String,
}

impl ColumnPredicate {
    /// SQL expression that is TRUE when the column counts as equivalent.
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

/// The full predicate set for a comparison: one node per comparable column.
#[derive(Debug, Clone)]
pub struct PredicateSet {
    predicates: Vec<ColumnPredicate>,
}

impl PredicateSet {
    /// Build predicates for every comparable column.
    ///
    /// Classification uses the source table's declared type only.
    pub fn build(
        columns: &[String],
        source_meta: &ColumnMetadata,
        classifier: &dyn TypeClassifier,
        config: &ComparisonConfig,
    ) -> Self {
        let predicates = columns
            .iter()
            .map(|column| {
                let declared = source_meta
                    .get(column)
                    .map(String::as_str)
                    .unwrap_or_default();
                let kind = classifier.classify(declared);
                ColumnPredicate {
                    sql: render_column_sql(column, kind, config),
                    column: column.clone(),
                    kind,
                }
            })
            .collect();

        Self { predicates }
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnPredicate> {
        self.predicates.iter()
    }

    /// Row-level aggregate predicate: every column must pass.
    pub fn row_predicate_sql(&self) -> String {
        self.predicates
            .iter()
            .map(|p| format!("({})", p.sql))
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

fn render_column_sql(column: &str, kind: ColumnKind, config: &ComparisonConfig) -> String {
    let t1 = format!("t1_{}", column);
    let t2 = format!("t2_{}", column);

    match kind {
        ColumnKind::Timestamp => match &config.timestamp_exclude_range {
            Some((start, end)) => {
                // Values inside the exclusion window never fail, on either side.
                format!(
                    "({t1} = {t2} OR ({t1} IS NULL AND {t2} IS NULL)) \
                     OR ({t1} BETWEEN '{start}' AND '{end}' \
                     OR {t2} BETWEEN '{start}' AND '{end}')",
                    t1 = t1,
                    t2 = t2,
                    start = format_timestamp(start),
                    end = format_timestamp(end),
                )
            }
            None => format!(
                "{t1} = {t2} OR ({t1} IS NULL AND {t2} IS NULL)",
                t1 = t1,
                t2 = t2
            ),
        },
        ColumnKind::Numeric => {
            // The GREATEST(..., 1) floor trades strict relative tolerance for
            // an absolute tolerance near zero, avoiding blowups when either
            // side approaches zero.
            format!(
                "ABS(COALESCE({t1}, 0) - COALESCE({t2}, 0)) <= \
                 {tolerance} * GREATEST(ABS(COALESCE({t1}, 0)), ABS(COALESCE({t2}, 0)), 1) \
                 OR ({t1} IS NULL AND {t2} IS NULL)",
                t1 = t1,
                t2 = t2,
                tolerance = config.value_tolerance,
            )
        }
        ColumnKind::String => {
            let (lhs, rhs) = if config.trim_strings {
                (format!("TRIM({})", t1), format!("TRIM({})", t2))
            } else {
                (t1.clone(), t2.clone())
            };
            format!(
                "{lhs} = {rhs} OR ({t1} IS NULL AND {t2} IS NULL)",
                lhs = lhs,
                rhs = rhs,
                t1 = t1,
                t2 = t2
            )
        }
        ColumnKind::Exact => format!(
            "{t1} = {t2} OR ({t1} IS NULL AND {t2} IS NULL)",
            t1 = t1,
            t2 = t2
        ),
    }
}

fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Join condition over the primary-key columns: `t1.k = t2.k AND ...`.
pub fn pk_join_condition(primary_key: &[String]) -> String {
    primary_key
        .iter()
        .map(|pk| format!("t1.{pk} = t2.{pk}", pk = pk))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Select list for the joined base CTE: primary-key columns plus
/// `t1_<col>` / `t2_<col>` aliases for every compared column.
pub fn join_select_clause(primary_key: &[String], columns: &[String]) -> String {
    let mut select_columns = Vec::with_capacity(primary_key.len() + columns.len() * 2);
    for pk in primary_key {
        select_columns.push(format!("t1.{pk} AS {pk}", pk = pk));
    }
    for column in columns {
        select_columns.push(format!("t1.{col} AS t1_{col}", col = column));
        select_columns.push(format!("t2.{col} AS t2_{col}", col = column));
    }
    select_columns.join(", ")
}
