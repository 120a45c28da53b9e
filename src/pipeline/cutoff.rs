//! Empirical acceptance cutoff
//!
//! The cutoff is the lowest score seen among accepted applications. It is a
//! descriptive figure only: nothing guarantees every application scoring at
//! or above it was accepted.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;

use super::prepare::{DECISION_COLUMN, SCORE_COLUMN};

/// Result of the cutoff estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Cutoff {
    /// Minimum score among accepted rows
    Estimated(f64),
    /// A score column exists but no accepted row carries a score
    Undefined,
    /// The dataset has no score column
    NotApplicable,
}

impl Cutoff {
    pub fn value(&self) -> Option<f64> {
        match self {
            Cutoff::Estimated(v) => Some(*v),
            _ => None,
        }
    }
}

/// Decision indicator and score for each row, in row order
pub struct ScoredRows {
    pub decisions: Vec<Option<i64>>,
    pub scores: Vec<Option<f64>>,
}

impl ScoredRows {
    /// Finite scores of rows whose decision equals `decision`
    pub fn scores_for(&self, decision: i64) -> Vec<f64> {
        self.decisions
            .iter()
            .zip(self.scores.iter())
            .filter_map(|(d, s)| match (d, s) {
                (Some(d), Some(s)) if *d == decision && s.is_finite() => Some(*s),
                _ => None,
            })
            .collect()
    }

    /// Every finite score regardless of decision
    pub fn all_scores(&self) -> Vec<f64> {
        self.scores.iter().flatten().copied().filter(|s| s.is_finite()).collect()
    }
}

/// Extract decision and score columns.
///
/// Returns `Ok(None)` when the table has no score column.
pub fn scored_rows(df: &DataFrame) -> Result<Option<ScoredRows>> {
    let decision = df
        .column(DECISION_COLUMN)
        .with_context(|| format!("Column '{}' not found", DECISION_COLUMN))?;

    let score = match df.column(SCORE_COLUMN) {
        Ok(col) => col,
        Err(_) => return Ok(None),
    };

    let decisions: Vec<Option<i64>> = decision
        .cast(&DataType::Int64)
        .with_context(|| format!("Column '{}' is not an integer indicator", DECISION_COLUMN))?
        .i64()?
        .into_iter()
        .collect();

    let scores: Vec<Option<f64>> = score
        .cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' is not numeric", SCORE_COLUMN))?
        .f64()?
        .into_iter()
        .collect();

    Ok(Some(ScoredRows { decisions, scores }))
}

/// Estimate the acceptance cutoff from a prepared table
pub fn estimate_cutoff(df: &DataFrame) -> Result<Cutoff> {
    let rows = match scored_rows(df)? {
        Some(rows) => rows,
        None => return Ok(Cutoff::NotApplicable),
    };

    let cutoff = rows
        .scores_for(1)
        .into_iter()
        .reduce(f64::min)
        .map_or(Cutoff::Undefined, Cutoff::Estimated);

    tracing::debug!(?cutoff, "cutoff estimated");
    Ok(cutoff)
}

/// How cleanly the cutoff separates the two outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CutoffDiagnostics {
    pub accepted_total: usize,
    pub accepted_at_or_above: usize,
    pub denied_total: usize,
    pub denied_at_or_above: usize,
}

impl CutoffDiagnostics {
    /// Share of denied applications scoring at or above the cutoff
    pub fn denied_above_ratio(&self) -> f64 {
        if self.denied_total == 0 {
            0.0
        } else {
            self.denied_at_or_above as f64 / self.denied_total as f64
        }
    }
}

/// Count scored rows on either side of the cutoff per outcome
pub fn cutoff_diagnostics(rows: &ScoredRows, cutoff: f64) -> CutoffDiagnostics {
    let accepted = rows.scores_for(1);
    let denied = rows.scores_for(0);

    CutoffDiagnostics {
        accepted_total: accepted.len(),
        accepted_at_or_above: accepted.iter().filter(|s| **s >= cutoff).count(),
        denied_total: denied.len(),
        denied_at_or_above: denied.iter().filter(|s| **s >= cutoff).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cutoff_is_min_accepted_score() {
        let df = df! {
            "score" => [10.0f64, 20.0, 5.0],
            "decision" => [0i8, 1, 1],
        }
        .unwrap();

        assert_eq!(estimate_cutoff(&df).unwrap(), Cutoff::Estimated(5.0));
    }

    #[test]
    fn test_cutoff_ignores_denied_rows() {
        let df = df! {
            "score" => [1.0f64, 20.0, 30.0],
            "decision" => [0i8, 1, 1],
        }
        .unwrap();

        assert_eq!(estimate_cutoff(&df).unwrap().value(), Some(20.0));
    }

    #[test]
    fn test_no_accepted_rows_is_undefined() {
        let df = df! {
            "score" => [10.0f64, 20.0],
            "decision" => [0i8, 0],
        }
        .unwrap();

        assert_eq!(estimate_cutoff(&df).unwrap(), Cutoff::Undefined);
    }

    #[test]
    fn test_null_scores_among_accepted_are_skipped() {
        let df = df! {
            "score" => [None, Some(42.0f64), None],
            "decision" => [1i8, 1, 0],
        }
        .unwrap();

        assert_eq!(estimate_cutoff(&df).unwrap(), Cutoff::Estimated(42.0));
    }

    #[test]
    fn test_missing_score_column_not_applicable() {
        let df = df! {
            "decision" => [0i8, 1],
            "income" => [1.0f64, 2.0],
        }
        .unwrap();

        assert_eq!(estimate_cutoff(&df).unwrap(), Cutoff::NotApplicable);
    }

    #[test]
    fn test_missing_decision_column_is_error() {
        let df = df! { "score" => [1.0f64] }.unwrap();
        assert!(estimate_cutoff(&df).is_err());
    }

    #[test]
    fn test_diagnostics_counts_overlap() {
        let df = df! {
            "score" => [10.0f64, 20.0, 5.0, 3.0, 7.0],
            "decision" => [0i8, 1, 1, 0, 0],
        }
        .unwrap();

        let rows = scored_rows(&df).unwrap().unwrap();
        let diag = cutoff_diagnostics(&rows, 5.0);

        assert_eq!(diag.accepted_total, 2);
        assert_eq!(diag.accepted_at_or_above, 2);
        assert_eq!(diag.denied_total, 3);
        assert_eq!(diag.denied_at_or_above, 2);
        assert!((diag.denied_above_ratio() - 2.0 / 3.0).abs() < 1e-12);
    }
}
