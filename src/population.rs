//! Primary-key population reconciliation
//!
//! Compares the primary-key populations of the two tables independently of
//! value content. Value comparison runs over an inner join and would
//! silently drop unmatched rows, so population divergence must be checked
//! first or it would be invisible.

use crate::config::ComparisonConfig;
use crate::engine::{DuckDbEngine, TabularRow};
use crate::error::Result;
use crate::metadata::TableRef;
use crate::predicate::pk_join_condition;
use crate::result::FailedRowSample;

/// Outcome of the row-count reconciliation step.
#[derive(Debug, Clone)]
pub struct PopulationCheck {
    pub source_rows: u64,
    pub target_rows: u64,
    pub passed: bool,
    /// Count difference relative to the larger table, in [0, 1].
    pub failed_fraction: f64,
    /// Keys present on one side only, both directions, tagged with the
    /// table they are missing from. Populated only on failure.
    pub missing_key_samples: Vec<FailedRowSample>,
    /// Query text of the key difference probe, for reproducibility.
    pub diagnostic_query: String,
}

impl PopulationCheck {
    /// Population size used for the overall result on failure.
    pub fn larger_count(&self) -> u64 {
        self.source_rows.max(self.target_rows)
    }
}

/// Count both tables and, when the divergence exceeds `row_tolerance`,
/// collect a bounded sample of keys missing from either side.
pub fn check_population(
    engine: &DuckDbEngine,
    source: &TableRef,
    target: &TableRef,
    config: &ComparisonConfig,
    sample_limit: usize,
) -> Result<PopulationCheck> {
    let source_rows = engine.count(&format!("SELECT COUNT(*) FROM {}", source.qualified()))?;
    let target_rows = engine.count(&format!("SELECT COUNT(*) FROM {}", target.qualified()))?;

    let larger = source_rows.max(target_rows);
    let failed_fraction = if larger == 0 {
        0.0
    } else {
        source_rows.abs_diff(target_rows) as f64 / larger as f64
    };

    let passed = failed_fraction <= config.row_tolerance;
    let diagnostic_query =
        missing_keys_sql(source, target, &config.primary_key, sample_limit);

    let mut missing_key_samples = Vec::new();
    if !passed {
        log::debug!(
            "population divergence {:.4} exceeds row tolerance {:.4} for {} vs {}",
            failed_fraction,
            config.row_tolerance,
            source,
            target
        );
        // Both directions: keys in source missing from target, and vice versa.
        for (present, absent) in [(source, target), (target, source)] {
            let sql = missing_keys_sql(present, absent, &config.primary_key, sample_limit);
            for row in engine.query_rows(&sql)? {
                missing_key_samples.push(missing_sample(row, absent));
            }
        }
    }

    Ok(PopulationCheck {
        source_rows,
        target_rows,
        passed,
        failed_fraction,
        missing_key_samples,
        diagnostic_query,
    })
}

/// Anti-join probe for keys present in `present` but absent from `absent`,
/// ordered by the first primary-key column for determinism.
fn missing_keys_sql(
    present: &TableRef,
    absent: &TableRef,
    primary_key: &[String],
    limit: usize,
) -> String {
    let select_keys = primary_key
        .iter()
        .map(|pk| format!("t1.{pk} AS {pk}", pk = pk))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "SELECT {select_keys} \
         FROM {present} t1 \
         LEFT JOIN {absent} t2 ON {join} \
         WHERE t2.{first_pk} IS NULL \
         ORDER BY t1.{first_pk} \
         LIMIT {limit}",
        select_keys = select_keys,
        present = present.qualified(),
        absent = absent.qualified(),
        join = pk_join_condition(primary_key),
        first_pk = primary_key[0],
        limit = limit,
    )
}

fn missing_sample(row: TabularRow, absent_from: &TableRef) -> FailedRowSample {
    FailedRowSample::missing(row, absent_from.qualified())
}
