//! Common test utilities and helpers

use tabrecon::{ComparisonConfig, DuckDbEngine, Result, TableRef};
use tempfile::TempDir;

/// Test fixture wrapping a DuckDB database seeded with paired schemas.
///
/// Tables live under `prod` (source side) and `raw` (target side), mirroring
/// the two pipelines a reconciliation run compares.
pub struct ReconFixture {
    pub temp_dir: TempDir,
    pub engine: DuckDbEngine,
}

impl ReconFixture {
    /// Create a fixture backed by a database file in a temp directory.
    pub fn new() -> Result<Self> {
        let _ = env_logger::builder().is_test(true).try_init();
        let temp_dir = TempDir::new()?;
        let engine = DuckDbEngine::open(&temp_dir.path().join("recon_test.duckdb"))?;
        engine.execute_batch(
            "CREATE SCHEMA IF NOT EXISTS prod; CREATE SCHEMA IF NOT EXISTS raw;",
        )?;
        Ok(Self { temp_dir, engine })
    }

    /// Create the same table shape in both schemas.
    pub fn create_pair(&self, table: &str, columns_sql: &str) -> Result<()> {
        for schema in ["prod", "raw"] {
            self.engine.execute(&format!(
                "CREATE OR REPLACE TABLE {}.{} ({})",
                schema, table, columns_sql
            ))?;
        }
        Ok(())
    }

    /// Seed `(id, name, value)` rows into one side of a pair.
    ///
    /// `value_step` follows the original migration-test data shape:
    /// row `i` gets `value = i * value_step`.
    pub fn seed_rows(&self, schema: &str, table: &str, rows: usize, value_step: f64) -> Result<()> {
        for i in 0..rows {
            self.engine.execute(&format!(
                "INSERT INTO {}.{} VALUES ({}, 'name_{}', {})",
                schema,
                table,
                i,
                i,
                i as f64 * value_step
            ))?;
        }
        Ok(())
    }

    /// Standard `(id, name, value)` pair with identical data on both sides.
    pub fn identical_tables(&self, table: &str, rows: usize) -> Result<()> {
        self.create_pair(table, "id INTEGER, name VARCHAR, value DOUBLE")?;
        self.seed_rows("prod", table, rows, 1.5)?;
        self.seed_rows("raw", table, rows, 1.5)?;
        Ok(())
    }

    pub fn source(&self, table: &str) -> TableRef {
        TableRef::new("prod", table)
    }

    pub fn target(&self, table: &str) -> TableRef {
        TableRef::new("raw", table)
    }
}

/// Configuration matching the original migration-test defaults: single `id`
/// key, 1% tolerances, trimmed strings.
pub fn strict_config() -> ComparisonConfig {
    let mut config = ComparisonConfig::new(vec!["id".to_string()]);
    config.value_tolerance = 0.01;
    config.row_tolerance = 0.01;
    config.trim_strings = true;
    config
}
