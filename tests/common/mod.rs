//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Header of the raw loan table used across fixtures
pub const RAW_HEADER: &str =
    "uuid,tracking_number,created_at,decision,ccr_worst_pmt_rating,score,income,utilization,constant";

/// Raw rows with a clear score separation between outcomes
///
/// - `score`: accepted rows all score >= 640, one denied row scores 655
/// - `income`: rises with acceptance
/// - `utilization`: falls with acceptance
/// - `constant`: zero variance
pub const RAW_ROWS: &[&str] = &[
    "u1,T001,2024-01-01T10:00:00,Accept,B,700.5,85000,0.20,1",
    "u2,T002,2024-01-02T10:00:00,Deny,D,520.0,30000,0.90,1",
    "u3,T003,2024-01-03T10:00:00,Accept,A,640.0,72000,0.35,1",
    "u4,T004,2024-01-04T10:00:00,Deny,C,600.25,41000,0.70,1",
    "u5,T005,2024-01-05T10:00:00,Accept,,690.0,90000,0.15,1",
    "u6,T006,2024-01-06T10:00:00,Deny,D,655.0,38000,0.80,1",
    "u7,T007,2024-01-07T10:00:00,Accept,B,720.0,99000,0.10,1",
    "u8,T008,2024-01-08T10:00:00,Deny,C,580.0,35000,0.85,1",
];

/// Write a CSV file from a header and rows into a fresh temp dir
pub fn write_csv(header: &str, rows: &[&str]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("raw_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "{}", header).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }

    (temp_dir, csv_path)
}

/// The standard raw loan table written to a temp CSV
pub fn create_raw_csv() -> (TempDir, PathBuf) {
    write_csv(RAW_HEADER, RAW_ROWS)
}

/// The standard raw table without its score column
pub fn create_raw_csv_without_score() -> (TempDir, PathBuf) {
    let header = RAW_HEADER.replace(",score", "");
    let rows: Vec<String> = RAW_ROWS
        .iter()
        .map(|row| {
            let mut fields: Vec<&str> = row.split(',').collect();
            fields.remove(5);
            fields.join(",")
        })
        .collect();
    let rows: Vec<&str> = rows.iter().map(|s| s.as_str()).collect();

    write_csv(&header, &rows)
}

/// A prepared-style frame with known correlations against `decision`
pub fn create_correlation_test_dataframe() -> DataFrame {
    df! {
        "decision" => [0i8, 1, 0, 1, 0, 1, 0, 1, 0, 1],
        "strong" => [0.0f64, 1.0, 0.1, 0.9, 0.0, 1.1, 0.2, 1.0, 0.1, 0.9],
        "inverse" => [5.0f64, 1.0, 4.0, 2.0, 5.0, 1.0, 4.5, 1.5, 5.0, 1.0],
        "moderate" => [5.0f64, 1.0, 8.0, 2.0, 9.0, 3.0, 7.0, 4.0, 6.0, 0.0],
        "constant" => [3.0f64; 10],
        "label" => ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"],
    }
    .unwrap()
}

/// Random prepared-style frame for property checks
pub fn create_random_scored_dataframe(rows: usize, seed: u64) -> DataFrame {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let decision: Vec<i8> = (0..rows).map(|_| rng.gen_range(0..2)).collect();
    let score: Vec<f64> = (0..rows).map(|_| rng.gen_range(300.0..850.0)).collect();

    df! {
        "decision" => decision,
        "score" => score,
    }
    .unwrap()
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}
