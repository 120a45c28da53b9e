//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::DEFAULT_TOP_CORRELATIONS;

/// loaneda - Profile a loan decision dataset and estimate the acceptance score cutoff.
///
/// With no arguments, reads data/raw_data.csv and writes charts and the
/// cutoff file to outputs/.
#[derive(Parser, Debug)]
#[command(name = "loaneda")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input file path (CSV or Parquet)
    #[arg(short, long, default_value = "data/raw_data.csv")]
    pub input: PathBuf,

    /// Directory for charts and the cutoff file (created if absent)
    #[arg(short, long, default_value = "outputs")]
    pub output_dir: PathBuf,

    /// Number of rows to use for schema inference (CSV only)
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Columns shown in the correlation heatmap, decision included
    #[arg(long, default_value_t = DEFAULT_TOP_CORRELATIONS, value_parser = validate_top_correlations)]
    pub top_correlations: usize,

    /// Number of bins for score histograms
    #[arg(long, default_value = "30", value_parser = validate_bins)]
    pub bins: usize,

    /// TrueType font used for chart text.
    /// Defaults to the first common system font found; charts are drawn
    /// without text when none is available.
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Also write eda_summary.json to the output directory
    #[arg(long, default_value = "false")]
    pub export_json: bool,

    /// Log pipeline details (overridden by RUST_LOG)
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,
}

impl Cli {
    /// Path of an artifact inside the output directory
    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

/// Validator for top_correlations parameter
fn validate_top_correlations(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid count", s))?;

    if value < 2 {
        Err(format!(
            "top_correlations must be at least 2 (decision plus one feature), got {}",
            value
        ))
    } else {
        Ok(value)
    }
}

/// Validator for bins parameter
fn validate_bins(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid count", s))?;

    if value == 0 {
        Err("bins must be greater than 0".to_string())
    } else {
        Ok(value)
    }
}
