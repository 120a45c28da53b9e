//! Tests for the acceptance cutoff estimate

use loaneda::pipeline::*;
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_cutoff_reference_example() {
    let df = df! {
        "score" => [10.0f64, 20.0, 5.0],
        "decision" => [0i8, 1, 1],
    }
    .unwrap();

    assert_eq!(estimate_cutoff(&df).unwrap(), Cutoff::Estimated(5.0));
}

#[test]
fn test_cutoff_without_accepted_rows_is_sentinel() {
    let df = df! {
        "score" => [10.0f64, 20.0, 5.0],
        "decision" => [0i8, 0, 0],
    }
    .unwrap();

    let cutoff = estimate_cutoff(&df).unwrap();
    assert_eq!(cutoff, Cutoff::Undefined);
    assert_eq!(cutoff.value(), None);
}

#[test]
fn test_cutoff_on_prepared_csv() {
    let (_temp_dir, csv_path) = common::create_raw_csv();
    let (raw, _, _, _) = load_dataset_with_progress(&csv_path, 100).unwrap();
    let prepared = prepare_dataset(&raw).unwrap();

    let cutoff = estimate_cutoff(&prepared.frame).unwrap();
    assert_eq!(cutoff, Cutoff::Estimated(640.0));

    let rows = scored_rows(&prepared.frame).unwrap().unwrap();
    let diag = cutoff_diagnostics(&rows, 640.0);
    assert_eq!(diag.accepted_total, 4);
    assert_eq!(diag.accepted_at_or_above, 4);
    assert_eq!(diag.denied_total, 4);
    assert_eq!(diag.denied_at_or_above, 1, "Denied row scoring 655 overlaps");
}

#[test]
fn test_cutoff_not_applicable_without_score() {
    let (_temp_dir, csv_path) = common::create_raw_csv_without_score();
    let (raw, _, _, _) = load_dataset_with_progress(&csv_path, 100).unwrap();
    let prepared = prepare_dataset(&raw).unwrap();

    assert_eq!(estimate_cutoff(&prepared.frame).unwrap(), Cutoff::NotApplicable);
    assert!(scored_rows(&prepared.frame).unwrap().is_none());
}

#[test]
fn test_cutoff_is_lower_bound_of_accepted_scores() {
    for seed in [1u64, 7, 42] {
        let df = common::create_random_scored_dataframe(500, seed);
        let cutoff = estimate_cutoff(&df).unwrap().value().unwrap();

        let rows = scored_rows(&df).unwrap().unwrap();
        let accepted = rows.scores_for(1);
        assert!(accepted.iter().all(|s| *s >= cutoff));
        assert!(accepted.contains(&cutoff), "Cutoff must be an observed score");

        let diag = cutoff_diagnostics(&rows, cutoff);
        assert_eq!(diag.accepted_at_or_above, diag.accepted_total);
    }
}
