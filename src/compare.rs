//! Table comparison orchestration
//!
//! Drives one comparison end to end: resolve metadata, build predicates,
//! reconcile the key populations, compare values over the primary-key join,
//! sample evidence, and assemble the `ComparisonResult`. Each call is
//! synchronous and self-contained; nothing persists between comparisons.

use crate::classify::{DuckDbTypeClassifier, TypeClassifier};
use crate::config::ComparisonConfig;
use crate::engine::DuckDbEngine;
use crate::error::{Result, TabreconError};
use crate::metadata::{comparable_columns, resolve_columns, TableRef};
use crate::population::check_population;
use crate::predicate::{join_select_clause, pk_join_condition, PredicateSet};
use crate::result::{ComparisonResult, Verdict};
use crate::sample::sample_failures;
use crate::DEFAULT_SAMPLE_LIMIT;
use indexmap::IndexMap;

/// Raw output of the joined aggregate-predicate query.
struct ValueComparison {
    total_rows: u64,
    failed_rows: u64,
    failed_columns: IndexMap<String, u64>,
    query: String,
}

/// Compares two tables expected to hold the same logical dataset.
///
/// Holds a borrowed engine (one connection per concurrent comparison) and a
/// type classifier. The default classifier understands DuckDB's type
/// vocabulary; supply another to target a different catalog.
pub struct TableComparator<'a> {
    engine: &'a DuckDbEngine,
    classifier: Box<dyn TypeClassifier>,
}

impl<'a> TableComparator<'a> {
    pub fn new(engine: &'a DuckDbEngine) -> Self {
        Self::with_classifier(engine, Box::new(DuckDbTypeClassifier))
    }

    pub fn with_classifier(engine: &'a DuckDbEngine, classifier: Box<dyn TypeClassifier>) -> Self {
        Self { engine, classifier }
    }

    /// Compare `source` against `target` under `config`.
    ///
    /// The population check runs before any value comparison and
    /// short-circuits on divergence beyond `row_tolerance`; the value
    /// comparison would otherwise hide unmatched rows behind its inner
    /// join.
    pub fn compare(
        &self,
        source: &TableRef,
        target: &TableRef,
        config: &ComparisonConfig,
    ) -> Result<ComparisonResult> {
        config.validate()?;

        let source_meta = resolve_columns(self.engine, source)?;
        let target_meta = resolve_columns(self.engine, target)?;
        config.validate_primary_key(&source_meta, &target_meta)?;

        let columns = comparable_columns(&source_meta, &target_meta, &config.exclude_columns);
        if columns.is_empty() {
            // Nothing to compare is a degenerate-but-expressible outcome,
            // distinct from a structural error.
            log::warn!(
                "no comparable columns remain for {} vs {}; reporting failure",
                source,
                target
            );
            return Ok(self.degenerate_result(source, target, config));
        }

        let predicates =
            PredicateSet::build(&columns, &source_meta, self.classifier.as_ref(), config);

        let population =
            check_population(self.engine, source, target, config, DEFAULT_SAMPLE_LIMIT)?;
        if !population.passed {
            return Ok(ComparisonResult {
                source_table: source.qualified(),
                target_table: target.qualified(),
                passed: false,
                verdict: Verdict::FailedOnPopulation,
                total_rows: population.larger_count(),
                failed_row_fraction: population.failed_fraction,
                failed_columns: IndexMap::new(),
                sample_failed_rows: if population.missing_key_samples.is_empty() {
                    None
                } else {
                    Some(population.missing_key_samples)
                },
                value_tolerance: config.value_tolerance,
                row_tolerance: config.row_tolerance,
                diagnostic_query: population.diagnostic_query,
            });
        }

        let values = self.compare_values(source, target, &columns, &predicates, config)?;

        let failed_row_fraction = if values.total_rows == 0 {
            0.0
        } else {
            values.failed_rows as f64 / values.total_rows as f64
        };
        let passed = failed_row_fraction <= config.row_tolerance;

        let sample_failed_rows = if values.failed_rows > 0 {
            // Sampler failures degrade to "no sample available"; the verdict
            // is already fixed by the counts above.
            match sample_failures(
                self.engine,
                source,
                target,
                &columns,
                &predicates,
                config,
                DEFAULT_SAMPLE_LIMIT,
            ) {
                Ok(samples) => Some(samples),
                Err(e) => {
                    log::warn!(
                        "failed-row sampling for {} vs {} degraded: {}",
                        source,
                        target,
                        e
                    );
                    None
                }
            }
        } else {
            None
        };

        Ok(ComparisonResult {
            source_table: source.qualified(),
            target_table: target.qualified(),
            passed,
            verdict: if passed {
                Verdict::Passed
            } else {
                Verdict::FailedOnValues
            },
            total_rows: values.total_rows,
            failed_row_fraction,
            failed_columns: values.failed_columns,
            sample_failed_rows,
            value_tolerance: config.value_tolerance,
            row_tolerance: config.row_tolerance,
            diagnostic_query: values.query,
        })
    }

    /// Joined aggregate-predicate query: total rows, failed rows, and
    /// per-column failure counts computed independently per column.
    fn compare_values(
        &self,
        source: &TableRef,
        target: &TableRef,
        columns: &[String],
        predicates: &PredicateSet,
        config: &ComparisonConfig,
    ) -> Result<ValueComparison> {
        // A NULL-vs-value mismatch makes the predicate itself NULL, so the
        // fail condition must be IS NOT TRUE rather than NOT, or such rows
        // would fail the row while counting against no column.
        let column_counts = predicates
            .iter()
            .map(|p| {
                format!(
                    "COALESCE(SUM(CASE WHEN ({pred}) IS NOT TRUE THEN 1 ELSE 0 END), 0) AS {col}_fails",
                    pred = p.sql(),
                    col = p.column
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        let query = format!(
            "WITH base_keys AS (\
                SELECT {select_clause} \
                FROM {source} t1 \
                INNER JOIN {target} t2 ON {join} \
             ), \
             test_data AS (\
                SELECT *, \
                CASE WHEN {row_predicate} THEN TRUE ELSE FALSE END AS row_passed \
                FROM base_keys \
             ) \
             SELECT \
                COUNT(*) AS total_rows, \
                COALESCE(SUM(CASE WHEN NOT row_passed THEN 1 ELSE 0 END), 0) AS failed_rows, \
                {column_counts} \
             FROM test_data",
            select_clause = join_select_clause(&config.primary_key, columns),
            source = source.qualified(),
            target = target.qualified(),
            join = pk_join_condition(&config.primary_key),
            row_predicate = predicates.row_predicate_sql(),
            column_counts = column_counts,
        );

        let row = self.engine.query_single_row(&query)?;

        let total_rows = read_count(&row, "total_rows")?;
        let failed_rows = read_count(&row, "failed_rows")?;

        let mut failed_columns = IndexMap::new();
        for column in columns {
            let fails = read_count(&row, &format!("{}_fails", column))?;
            if fails > 0 {
                failed_columns.insert(column.clone(), fails);
            }
        }

        Ok(ValueComparison {
            total_rows,
            failed_rows,
            failed_columns,
            query,
        })
    }

    fn degenerate_result(
        &self,
        source: &TableRef,
        target: &TableRef,
        config: &ComparisonConfig,
    ) -> ComparisonResult {
        ComparisonResult {
            source_table: source.qualified(),
            target_table: target.qualified(),
            passed: false,
            verdict: Verdict::FailedOnValues,
            total_rows: 0,
            failed_row_fraction: 0.0,
            failed_columns: IndexMap::new(),
            sample_failed_rows: None,
            value_tolerance: config.value_tolerance,
            row_tolerance: config.row_tolerance,
            diagnostic_query: String::new(),
        }
    }
}

fn read_count(row: &crate::engine::TabularRow, column: &str) -> Result<u64> {
    row.get(column)
        .and_then(|v| v.as_i64())
        .map(|n| n.max(0) as u64)
        .ok_or_else(|| {
            TabreconError::data_processing(format!(
                "aggregate query returned no integer column '{}'",
                column
            ))
        })
}
