//! Row-population reconciliation tests

use crate::common::{strict_config, ReconFixture};
use tabrecon::{ScalarValue, TableComparator, Verdict};

fn seed_different_rows(fixture: &ReconFixture) {
    fixture
        .create_pair("different_rows", "id INTEGER, name VARCHAR, value DOUBLE")
        .unwrap();
    fixture.seed_rows("prod", "different_rows", 12, 1.5).unwrap();
    fixture.seed_rows("raw", "different_rows", 10, 1.5).unwrap();
}

#[test]
fn test_row_count_divergence_fails_before_value_comparison() {
    let fixture = ReconFixture::new().unwrap();
    seed_different_rows(&fixture);

    let comparator = TableComparator::new(&fixture.engine);
    let result = comparator
        .compare(
            &fixture.source("different_rows"),
            &fixture.target("different_rows"),
            &strict_config(),
        )
        .unwrap();

    assert!(!result.passed);
    assert_eq!(result.verdict, Verdict::FailedOnPopulation);
    // Short-circuit: no value-level output is produced.
    assert!(result.failed_columns.is_empty());
    assert_eq!(result.total_rows, 12, "population size is the larger count");
    assert!((result.failed_row_fraction - 2.0 / 12.0).abs() < 1e-9);
}

#[test]
fn test_row_count_divergence_passes_with_high_row_tolerance() {
    let fixture = ReconFixture::new().unwrap();
    seed_different_rows(&fixture);

    let mut config = strict_config();
    config.row_tolerance = 0.20;

    let comparator = TableComparator::new(&fixture.engine);
    let result = comparator
        .compare(
            &fixture.source("different_rows"),
            &fixture.target("different_rows"),
            &config,
        )
        .unwrap();

    assert!(result.passed, "2/12 missing rows is within a 20% tolerance");
    assert_eq!(result.verdict, Verdict::Passed);
    // The surviving rows are identical, so the value comparison is clean.
    assert_eq!(result.total_rows, 10);
    assert!(result.failed_columns.is_empty());
}

#[test]
fn test_missing_keys_are_sampled_and_tagged_per_side() {
    let fixture = ReconFixture::new().unwrap();
    seed_different_rows(&fixture);

    let comparator = TableComparator::new(&fixture.engine);
    let result = comparator
        .compare(
            &fixture.source("different_rows"),
            &fixture.target("different_rows"),
            &strict_config(),
        )
        .unwrap();

    let samples = result.sample_failed_rows.as_ref().unwrap();
    assert_eq!(samples.len(), 2, "ids 10 and 11 exist in prod only");

    let ids: Vec<i64> = samples
        .iter()
        .map(|s| match &s.primary_key["id"] {
            ScalarValue::Int(i) => *i,
            other => panic!("unexpected key value: {:?}", other),
        })
        .collect();
    assert_eq!(ids, vec![10, 11], "ordered by the first primary-key column");

    for sample in samples {
        assert_eq!(sample.missing_from.as_deref(), Some("raw.different_rows"));
        assert!(sample.failed_columns.is_empty());
        assert!(sample.value_differences.is_empty());
    }
}

#[test]
fn test_missing_keys_are_probed_in_both_directions() {
    let fixture = ReconFixture::new().unwrap();
    fixture
        .create_pair("skewed", "id INTEGER, name VARCHAR, value DOUBLE")
        .unwrap();
    // prod holds ids 0..5, raw holds ids 3..12: both sides have orphans.
    for i in 0..6 {
        fixture
            .engine
            .execute(&format!(
                "INSERT INTO prod.skewed VALUES ({}, 'name_{}', {})",
                i,
                i,
                i as f64 * 1.5
            ))
            .unwrap();
    }
    for i in 3..13 {
        fixture
            .engine
            .execute(&format!(
                "INSERT INTO raw.skewed VALUES ({}, 'name_{}', {})",
                i,
                i,
                i as f64 * 1.5
            ))
            .unwrap();
    }

    let comparator = TableComparator::new(&fixture.engine);
    let result = comparator
        .compare(
            &fixture.source("skewed"),
            &fixture.target("skewed"),
            &strict_config(),
        )
        .unwrap();

    assert_eq!(result.verdict, Verdict::FailedOnPopulation);
    let samples = result.sample_failed_rows.as_ref().unwrap();

    let missing_from_raw = samples
        .iter()
        .filter(|s| s.missing_from.as_deref() == Some("raw.skewed"))
        .count();
    let missing_from_prod = samples
        .iter()
        .filter(|s| s.missing_from.as_deref() == Some("prod.skewed"))
        .count();
    assert_eq!(missing_from_raw, 3, "ids 0..2 are absent from raw");
    assert_eq!(missing_from_prod, 5, "7 orphans in raw, sampled down to 5");
}

#[test]
fn test_row_tolerance_is_monotonic() {
    let fixture = ReconFixture::new().unwrap();
    seed_different_rows(&fixture);

    let comparator = TableComparator::new(&fixture.engine);
    let source = fixture.source("different_rows");
    let target = fixture.target("different_rows");

    let mut previous_passed = false;
    for tolerance in [0.0, 0.01, 0.10, 0.1667, 0.20, 1.0] {
        let mut config = strict_config();
        config.row_tolerance = tolerance;
        let result = comparator.compare(&source, &target, &config).unwrap();
        assert!(
            result.passed || !previous_passed,
            "raising row_tolerance to {} turned a pass into a failure",
            tolerance
        );
        previous_passed = result.passed;
    }
    assert!(previous_passed);
}

#[test]
fn test_equal_empty_tables_pass() {
    let fixture = ReconFixture::new().unwrap();
    fixture
        .create_pair("empty", "id INTEGER, name VARCHAR, value DOUBLE")
        .unwrap();

    let comparator = TableComparator::new(&fixture.engine);
    let result = comparator
        .compare(
            &fixture.source("empty"),
            &fixture.target("empty"),
            &strict_config(),
        )
        .unwrap();

    assert!(result.passed);
    assert_eq!(result.total_rows, 0);
    assert_eq!(result.failed_row_fraction, 0.0);
}
