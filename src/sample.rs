//! Bounded evidence sampling for failed comparisons
//!
//! Retrieves a deterministic, bounded set of concrete failing rows with
//! source/target values and computed deltas. Sampling is a diagnostic aid
//! only; it never influences the pass/fail verdict.

use crate::config::ComparisonConfig;
use crate::engine::{DuckDbEngine, ScalarValue, TabularRow};
use crate::error::Result;
use crate::metadata::TableRef;
use crate::predicate::{join_select_clause, pk_join_condition, PredicateSet};
use crate::result::{FailedRowSample, ValueDiff};
use indexmap::IndexMap;

/// Fetch up to `limit` failing rows, ordered by the first primary-key
/// column, with per-column pass flags and source/target values.
pub fn sample_failures(
    engine: &DuckDbEngine,
    source: &TableRef,
    target: &TableRef,
    columns: &[String],
    predicates: &PredicateSet,
    config: &ComparisonConfig,
    limit: usize,
) -> Result<Vec<FailedRowSample>> {
    let sql = sample_sql(source, target, columns, predicates, config, limit);
    let rows = engine.query_rows(&sql)?;
    Ok(rows
        .into_iter()
        .map(|row| decode_sample(row, &config.primary_key, columns))
        .collect())
}

fn sample_sql(
    source: &TableRef,
    target: &TableRef,
    columns: &[String],
    predicates: &PredicateSet,
    config: &ComparisonConfig,
    limit: usize,
) -> String {
    // IS NOT TRUE, not NOT: a NULL-vs-value mismatch nulls the predicate,
    // and the flag must mark that column failed.
    let column_flags = predicates
        .iter()
        .map(|p| {
            format!(
                "CASE WHEN ({pred}) IS NOT TRUE THEN FALSE ELSE TRUE END AS {col}_passed",
                pred = p.sql(),
                col = p.column
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    let select_keys = config.primary_key.join(", ");
    let select_sources = columns
        .iter()
        .map(|c| format!("t1_{c} AS {c}_source", c = c))
        .collect::<Vec<_>>()
        .join(", ");
    let select_targets = columns
        .iter()
        .map(|c| format!("t2_{c} AS {c}_target", c = c))
        .collect::<Vec<_>>()
        .join(", ");
    let select_flags = columns
        .iter()
        .map(|c| format!("NOT {c}_passed AS {c}_failed", c = c))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "WITH base_keys AS (\
            SELECT {select_clause} \
            FROM {source} t1 \
            INNER JOIN {target} t2 ON {join} \
         ), \
         test_data AS (\
            SELECT *, \
            CASE WHEN {row_predicate} THEN TRUE ELSE FALSE END AS row_passed, \
            {column_flags} \
            FROM base_keys \
         ) \
         SELECT {select_keys}, {select_sources}, {select_targets}, {select_flags} \
         FROM test_data \
         WHERE NOT row_passed \
         ORDER BY {order_key} \
         LIMIT {limit}",
        select_clause = join_select_clause(&config.primary_key, columns),
        source = source.qualified(),
        target = target.qualified(),
        join = pk_join_condition(&config.primary_key),
        row_predicate = predicates.row_predicate_sql(),
        column_flags = column_flags,
        select_keys = select_keys,
        select_sources = select_sources,
        select_targets = select_targets,
        select_flags = select_flags,
        order_key = config.primary_key[0],
        limit = limit,
    )
}

fn decode_sample(row: TabularRow, primary_key: &[String], columns: &[String]) -> FailedRowSample {
    let mut key_values = IndexMap::with_capacity(primary_key.len());
    for pk in primary_key {
        let value = row.get(pk).cloned().unwrap_or(ScalarValue::Null);
        key_values.insert(pk.clone(), value);
    }

    let failed_columns: Vec<String> = columns
        .iter()
        .filter(|c| {
            matches!(
                row.get(&format!("{}_failed", c)),
                Some(ScalarValue::Bool(true))
            )
        })
        .cloned()
        .collect();

    let mut value_differences = IndexMap::with_capacity(failed_columns.len());
    for column in &failed_columns {
        let source = row
            .get(&format!("{}_source", column))
            .cloned()
            .unwrap_or(ScalarValue::Null);
        let target = row
            .get(&format!("{}_target", column))
            .cloned()
            .unwrap_or(ScalarValue::Null);
        value_differences.insert(column.clone(), ValueDiff::new(source, target));
    }

    FailedRowSample {
        primary_key: key_values,
        failed_columns,
        value_differences,
        missing_from: None,
    }
}
