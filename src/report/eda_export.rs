//! JSON export of the analysis run

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{
    ColumnStats, Cutoff, CutoffDiagnostics, DatasetProfile, RatingEncoding, TargetCorrelation,
};

/// File name of the JSON summary
pub const EDA_SUMMARY_FILE: &str = "eda_summary.json";

/// Metadata about the analysis run
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the analysis (RFC 3339)
    pub timestamp: String,
    pub loaneda_version: String,
    pub input_file: String,
}

/// Complete analysis export
#[derive(Serialize)]
pub struct EdaExport<'a> {
    pub metadata: RunMetadata,
    /// Profile of the raw table as loaded
    pub raw_profile: &'a DatasetProfile,
    /// Profile of the prepared table
    pub prepared_profile: &'a DatasetProfile,
    pub rating_encoding: &'a RatingEncoding,
    pub statistics: &'a [ColumnStats],
    pub decision_correlations: &'a [TargetCorrelation],
    pub cutoff: Cutoff,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutoff_diagnostics: Option<CutoffDiagnostics>,
}

/// Parameters describing the run for the export metadata
pub struct ExportParams<'a> {
    pub input_file: &'a str,
    pub raw_profile: &'a DatasetProfile,
    pub prepared_profile: &'a DatasetProfile,
    pub rating_encoding: &'a RatingEncoding,
    pub statistics: &'a [ColumnStats],
    pub decision_correlations: &'a [TargetCorrelation],
    pub cutoff: Cutoff,
    pub cutoff_diagnostics: Option<CutoffDiagnostics>,
}

/// Write the run summary as pretty-printed JSON
pub fn export_eda_summary(output_path: &Path, params: &ExportParams) -> Result<()> {
    let export = EdaExport {
        metadata: RunMetadata {
            timestamp: Utc::now().to_rfc3339(),
            loaneda_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: params.input_file.to_string(),
        },
        raw_profile: params.raw_profile,
        prepared_profile: params.prepared_profile,
        rating_encoding: params.rating_encoding,
        statistics: params.statistics,
        decision_correlations: params.decision_correlations,
        cutoff: params.cutoff,
        cutoff_diagnostics: params.cutoff_diagnostics,
    };

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize analysis summary to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write analysis summary to {}", output_path.display()))?;

    Ok(())
}
