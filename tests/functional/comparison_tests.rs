//! Value-level comparison tests over seeded table pairs

use crate::common::{strict_config, ReconFixture};
use tabrecon::{ScalarValue, TableComparator, Verdict};

#[test]
fn test_identical_tables_pass() {
    let fixture = ReconFixture::new().unwrap();
    fixture.identical_tables("identical_table", 10).unwrap();

    let comparator = TableComparator::new(&fixture.engine);
    let result = comparator
        .compare(
            &fixture.source("identical_table"),
            &fixture.target("identical_table"),
            &strict_config(),
        )
        .unwrap();

    assert!(result.passed);
    assert_eq!(result.verdict, Verdict::Passed);
    assert_eq!(result.total_rows, 10);
    assert_eq!(result.failed_row_fraction, 0.0);
    assert!(result.failed_columns.is_empty());
    assert!(result.sample_failed_rows.is_none());
}

#[test]
fn test_different_values_fail_and_name_the_column() {
    let fixture = ReconFixture::new().unwrap();
    fixture
        .create_pair("different_values", "id INTEGER, name VARCHAR, value DOUBLE")
        .unwrap();
    fixture.seed_rows("prod", "different_values", 10, 1.5).unwrap();
    fixture.seed_rows("raw", "different_values", 10, 1.6).unwrap();

    let comparator = TableComparator::new(&fixture.engine);
    let result = comparator
        .compare(
            &fixture.source("different_values"),
            &fixture.target("different_values"),
            &strict_config(),
        )
        .unwrap();

    assert!(!result.passed);
    assert_eq!(result.verdict, Verdict::FailedOnValues);
    assert!(result.failed_row_fraction > 0.0);
    assert!(result.failed_columns.contains_key("value"));
    // Row 0 has value 0.0 on both sides, so exactly 9 of 10 rows fail.
    assert_eq!(result.failed_columns["value"], 9);
    assert!((result.failed_row_fraction - 0.9).abs() < 1e-9);
    // Only the value column diverges.
    assert_eq!(result.failed_columns.len(), 1);
}

#[test]
fn test_different_values_pass_with_high_tolerance() {
    let fixture = ReconFixture::new().unwrap();
    fixture
        .create_pair("different_values", "id INTEGER, name VARCHAR, value DOUBLE")
        .unwrap();
    fixture.seed_rows("prod", "different_values", 10, 1.5).unwrap();
    fixture.seed_rows("raw", "different_values", 10, 1.6).unwrap();

    let mut config = strict_config();
    config.value_tolerance = 0.10;

    let comparator = TableComparator::new(&fixture.engine);
    let result = comparator
        .compare(
            &fixture.source("different_values"),
            &fixture.target("different_values"),
            &config,
        )
        .unwrap();

    assert!(result.passed, "10% tolerance covers a ~6.7% divergence");
    assert_eq!(result.verdict, Verdict::Passed);
}

#[test]
fn test_failed_row_samples_are_bounded_ordered_and_carry_deltas() {
    let fixture = ReconFixture::new().unwrap();
    fixture
        .create_pair("different_values", "id INTEGER, name VARCHAR, value DOUBLE")
        .unwrap();
    fixture.seed_rows("prod", "different_values", 10, 1.5).unwrap();
    fixture.seed_rows("raw", "different_values", 10, 1.6).unwrap();

    let comparator = TableComparator::new(&fixture.engine);
    let result = comparator
        .compare(
            &fixture.source("different_values"),
            &fixture.target("different_values"),
            &strict_config(),
        )
        .unwrap();

    let samples = result.sample_failed_rows.as_ref().unwrap();
    assert_eq!(samples.len(), 5, "evidence is truncated to the limit");

    // Row 0 passes (0.0 == 0.0), so the first failing key is id = 1 and the
    // sample order follows the first primary-key column.
    let ids: Vec<i64> = samples
        .iter()
        .map(|s| match &s.primary_key["id"] {
            ScalarValue::Int(i) => *i,
            other => panic!("unexpected key value: {:?}", other),
        })
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);

    let first = &samples[0];
    assert_eq!(first.failed_columns, vec!["value"]);
    assert!(first.missing_from.is_none());

    let diff = &first.value_differences["value"];
    assert_eq!(diff.source, ScalarValue::Float(1.5));
    assert_eq!(diff.target, ScalarValue::Float(1.6));
    let delta = diff.diff.unwrap();
    assert!((delta - 0.1).abs() < 1e-9);
    let pct = diff.diff_pct.unwrap();
    assert!((pct - 100.0 * 0.1 / 1.5).abs() < 1e-6);
}

#[test]
fn test_comparison_is_idempotent() {
    let fixture = ReconFixture::new().unwrap();
    fixture
        .create_pair("different_values", "id INTEGER, name VARCHAR, value DOUBLE")
        .unwrap();
    fixture.seed_rows("prod", "different_values", 10, 1.5).unwrap();
    fixture.seed_rows("raw", "different_values", 10, 1.6).unwrap();

    let comparator = TableComparator::new(&fixture.engine);
    let source = fixture.source("different_values");
    let target = fixture.target("different_values");
    let config = strict_config();

    let first = comparator.compare(&source, &target, &config).unwrap();
    let second = comparator.compare(&source, &target, &config).unwrap();

    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[test]
fn test_value_tolerance_is_monotonic() {
    let fixture = ReconFixture::new().unwrap();
    fixture
        .create_pair("different_values", "id INTEGER, name VARCHAR, value DOUBLE")
        .unwrap();
    fixture.seed_rows("prod", "different_values", 10, 1.5).unwrap();
    fixture.seed_rows("raw", "different_values", 10, 1.6).unwrap();

    let comparator = TableComparator::new(&fixture.engine);
    let source = fixture.source("different_values");
    let target = fixture.target("different_values");

    let mut previous_passed = false;
    for tolerance in [0.001, 0.01, 0.05, 0.0625, 0.07, 0.10, 0.50] {
        let mut config = strict_config();
        config.value_tolerance = tolerance;
        let result = comparator.compare(&source, &target, &config).unwrap();
        assert!(
            result.passed || !previous_passed,
            "raising value_tolerance to {} turned a pass into a failure",
            tolerance
        );
        previous_passed = result.passed;
    }
    assert!(previous_passed, "largest tolerance must pass");
}

#[test]
fn test_result_echoes_tolerances_and_query() {
    let fixture = ReconFixture::new().unwrap();
    fixture.identical_tables("identical_table", 3).unwrap();

    let comparator = TableComparator::new(&fixture.engine);
    let result = comparator
        .compare(
            &fixture.source("identical_table"),
            &fixture.target("identical_table"),
            &strict_config(),
        )
        .unwrap();

    assert_eq!(result.value_tolerance, 0.01);
    assert_eq!(result.row_tolerance, 0.01);
    assert_eq!(result.source_table, "prod.identical_table");
    assert_eq!(result.target_table, "raw.identical_table");
    assert!(result.diagnostic_query.contains("INNER JOIN"));
    assert!(result.diagnostic_query.contains("row_passed"));
}
