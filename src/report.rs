//! Terminal rendering of comparison results
//!
//! Everything printed here comes from the `ComparisonResult` itself; no
//! queries are re-issued against the data engine.

use crate::result::{ComparisonResult, Verdict};

/// Pretty printer for reconciliation output
pub struct ReconReporter;

impl ReconReporter {
    /// Print a one-table summary line plus the headline numbers.
    pub fn print_result(result: &ComparisonResult) {
        let icon = if result.passed { "✅" } else { "❌" };
        println!(
            "{} {} → {}",
            icon, result.source_table, result.target_table
        );
        println!("├─ Verdict: {}", verdict_label(result.verdict));
        println!("├─ Total rows: {}", result.total_rows);
        println!(
            "├─ Failed rows: {:.2}% ({} rows)",
            result.failed_row_fraction * 100.0,
            result.failed_rows()
        );
        println!(
            "└─ Tolerances: value {:.4}, row {:.4}",
            result.value_tolerance, result.row_tolerance
        );
    }

    /// Print failed-column counts and the bounded failing-row samples.
    pub fn print_failure_details(result: &ComparisonResult) {
        if result.passed {
            return;
        }

        if !result.failed_columns.is_empty() {
            println!("Failed columns:");
            for (column, count) in &result.failed_columns {
                let pct = if result.total_rows > 0 {
                    *count as f64 / result.total_rows as f64 * 100.0
                } else {
                    0.0
                };
                println!("  {}: {} rows ({:.2}%)", column, count, pct);
            }
        }

        let Some(samples) = &result.sample_failed_rows else {
            println!("No failing-row sample available.");
            return;
        };

        println!("Sample failed rows:");
        for (i, sample) in samples.iter().enumerate() {
            println!("Failed Row {}:", i + 1);

            let key = sample
                .primary_key
                .iter()
                .map(|(k, v)| format!("{} = {}", k, v))
                .collect::<Vec<_>>()
                .join(", ");
            println!("  Primary Key: {}", key);

            if let Some(missing_from) = &sample.missing_from {
                println!("  Missing from: {}", missing_from);
                continue;
            }

            if !sample.failed_columns.is_empty() {
                println!("  Failed Columns: {}", sample.failed_columns.join(", "));
            }

            if !sample.value_differences.is_empty() {
                println!("  Value Differences:");
                for (column, diff) in &sample.value_differences {
                    match (diff.diff, diff.diff_pct) {
                        (Some(delta), Some(pct)) => println!(
                            "    {}: {} → {} (diff: {:+.4}, {:+.2}%)",
                            column, diff.source, diff.target, delta, pct
                        ),
                        _ => println!("    {}: {} → {}", column, diff.source, diff.target),
                    }
                }
            }
        }
    }

    /// Print a run-level summary for a batch of compared table pairs.
    pub fn print_summary(results: &[ComparisonResult]) {
        let failed: Vec<&ComparisonResult> = results.iter().filter(|r| !r.passed).collect();

        if failed.is_empty() {
            println!("✅ ALL {} TABLE PAIRS PASSED", results.len());
            return;
        }

        println!("⚠️ FAILED TABLE PAIRS: {}/{}", failed.len(), results.len());
        for result in failed {
            Self::print_result(result);
            Self::print_failure_details(result);
        }
    }
}

fn verdict_label(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Passed => "passed",
        Verdict::FailedOnValues => "failed on values",
        Verdict::FailedOnPopulation => "failed on row population",
    }
}
