//! Error types for dataset preparation.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while turning the raw loan table into the prepared table.
///
/// Any of these aborts preparation; no partially prepared table is returned.
#[derive(Debug, Error)]
pub enum PrepareError {
    /// A column the preparation step relies on is absent from the input.
    #[error("Required column '{0}' not found in dataset")]
    MissingColumn(String),

    /// The decision column holds something other than "Accept" or "Deny".
    #[error("Unexpected decision value '{value}' at row {row} (expected \"Accept\" or \"Deny\")")]
    UnexpectedDecision { row: usize, value: String },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}
