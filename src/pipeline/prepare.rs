//! Dataset preparation
//!
//! Turns the raw loan table into the analysis table: identifier and
//! timestamp columns are dropped, the decision label becomes a 0/1 indicator
//! and the worst payment rating becomes an integer category code.

use std::collections::BTreeSet;

use polars::prelude::*;
use serde::Serialize;

use super::error::PrepareError;

/// Columns with no analytic value that are removed before analysis
pub const DROPPED_COLUMNS: [&str; 3] = ["uuid", "tracking_number", "created_at"];

/// Decision outcome column
pub const DECISION_COLUMN: &str = "decision";

/// Categorical rating column encoded as integer codes
pub const RATING_COLUMN: &str = "ccr_worst_pmt_rating";

/// Optional score column used for the cutoff estimate
pub const SCORE_COLUMN: &str = "score";

/// Code assigned to a null rating
pub const NULL_RATING_CODE: i32 = -1;

/// Outcome of a loan application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Deny,
    Accept,
}

impl Decision {
    /// Parse the raw label. Matching is exact.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Deny" => Some(Decision::Deny),
            "Accept" => Some(Decision::Accept),
            _ => None,
        }
    }

    pub fn code(self) -> i8 {
        match self {
            Decision::Deny => 0,
            Decision::Accept => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Decision::Deny => "Deny",
            Decision::Accept => "Accept",
        }
    }
}

/// Mapping from rating category code to the raw value it replaced.
///
/// `categories[code]` is the raw value; categories are sorted so the same
/// set of raw values always receives the same codes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingEncoding {
    pub categories: Vec<String>,
    pub null_count: usize,
}

impl RatingEncoding {
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Output of the preparation step
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub frame: DataFrame,
    pub rating_encoding: RatingEncoding,
}

/// Prepare the raw loan table for analysis.
///
/// Row count and the relative order of surviving columns are preserved.
/// Fails without producing a table if a required column is missing or a
/// decision value is anything other than "Accept" or "Deny".
pub fn prepare_dataset(raw: &DataFrame) -> Result<PreparedDataset, PrepareError> {
    for required in DROPPED_COLUMNS
        .iter()
        .chain([DECISION_COLUMN, RATING_COLUMN].iter())
    {
        if raw.column(required).is_err() {
            return Err(PrepareError::MissingColumn(required.to_string()));
        }
    }

    let decision = encode_decision(raw.column(DECISION_COLUMN)?)?;
    let (rating, rating_encoding) = encode_rating(raw.column(RATING_COLUMN)?)?;

    let mut frame = raw.drop_many(DROPPED_COLUMNS);
    frame.with_column(decision)?;
    frame.with_column(rating)?;

    tracing::debug!(
        rows = frame.height(),
        cols = frame.width(),
        rating_categories = rating_encoding.len(),
        "dataset prepared"
    );

    Ok(PreparedDataset {
        frame,
        rating_encoding,
    })
}

/// Map decision labels to an Int8 indicator (Deny = 0, Accept = 1)
fn encode_decision(col: &Column) -> Result<Column, PrepareError> {
    let labels = col.cast(&DataType::String)?;

    let mut codes: Vec<i8> = Vec::with_capacity(labels.len());
    for (row, label) in labels.str()?.into_iter().enumerate() {
        let decision = label
            .and_then(Decision::from_label)
            .ok_or_else(|| PrepareError::UnexpectedDecision {
                row,
                value: label.unwrap_or("null").to_string(),
            })?;
        codes.push(decision.code());
    }

    Ok(Column::new(DECISION_COLUMN.into(), codes))
}

/// Replace rating values with Int32 category codes.
///
/// Numeric ratings are ordered numerically, everything else lexically.
fn encode_rating(col: &Column) -> Result<(Column, RatingEncoding), PrepareError> {
    let null_count = col.null_count();

    let (codes, categories) = if col.dtype().is_primitive_numeric() {
        let floats = col.cast(&DataType::Float64)?;
        let values: Vec<Option<f64>> = floats
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();

        let mut distinct: Vec<f64> = values.iter().flatten().copied().collect();
        distinct.sort_by(f64::total_cmp);
        distinct.dedup();

        let codes: Vec<i32> = values
            .iter()
            .map(|v| match v {
                Some(x) => distinct
                    .binary_search_by(|probe| probe.total_cmp(x))
                    .map(|i| i as i32)
                    .unwrap_or(NULL_RATING_CODE),
                None => NULL_RATING_CODE,
            })
            .collect();

        let categories = distinct.iter().map(|v| format_numeric_category(*v)).collect();
        (codes, categories)
    } else {
        let text = col.cast(&DataType::String)?;
        let values: Vec<Option<&str>> = text.str()?.into_iter().collect();

        let distinct: Vec<&str> = values
            .iter()
            .flatten()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let codes: Vec<i32> = values
            .iter()
            .map(|v| match v {
                Some(s) => distinct
                    .binary_search(s)
                    .map(|i| i as i32)
                    .unwrap_or(NULL_RATING_CODE),
                None => NULL_RATING_CODE,
            })
            .collect();

        let categories = distinct.iter().map(|s| s.to_string()).collect();
        (codes, categories)
    };

    Ok((
        Column::new(RATING_COLUMN.into(), codes),
        RatingEncoding {
            categories,
            null_count,
        },
    ))
}

fn format_numeric_category(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
