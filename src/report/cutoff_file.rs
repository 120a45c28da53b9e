//! Plain-text cutoff artifact

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::pipeline::Cutoff;

/// File name of the cutoff artifact
pub const CUTOFF_FILE: &str = "score_cutoff.txt";

/// Text written for a cutoff, or `None` when there is no score to report on
pub fn format_cutoff_line(cutoff: &Cutoff) -> Option<String> {
    match cutoff {
        Cutoff::Estimated(v) => Some(format!(
            "Estimated score cutoff for acceptance: {:.4}",
            v
        )),
        Cutoff::Undefined => Some(
            "Estimated score cutoff for acceptance: undefined (no accepted applications with a score)"
                .to_string(),
        ),
        Cutoff::NotApplicable => None,
    }
}

/// Write `score_cutoff.txt` into `output_dir`.
///
/// Nothing is written when the dataset has no score column.
pub fn write_cutoff_file(output_dir: &Path, cutoff: &Cutoff) -> Result<Option<PathBuf>> {
    let line = match format_cutoff_line(cutoff) {
        Some(line) => line,
        None => return Ok(None),
    };

    let path = output_dir.join(CUTOFF_FILE);
    std::fs::write(&path, format!("{}\n", line))
        .with_context(|| format!("Failed to write cutoff to {}", path.display()))?;

    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_four_decimals() {
        assert_eq!(
            format_cutoff_line(&Cutoff::Estimated(612.5)).unwrap(),
            "Estimated score cutoff for acceptance: 612.5000"
        );
        assert_eq!(
            format_cutoff_line(&Cutoff::Estimated(0.123456)).unwrap(),
            "Estimated score cutoff for acceptance: 0.1235"
        );
    }

    #[test]
    fn test_undefined_cutoff_is_explicit() {
        let line = format_cutoff_line(&Cutoff::Undefined).unwrap();
        assert!(line.contains("undefined"));
        assert!(!line.contains("NaN"));
    }

    #[test]
    fn test_write_skipped_without_score() {
        let dir = TempDir::new().unwrap();
        let written = write_cutoff_file(dir.path(), &Cutoff::NotApplicable).unwrap();

        assert!(written.is_none());
        assert!(!dir.path().join(CUTOFF_FILE).exists());
    }

    #[test]
    fn test_write_single_line() {
        let dir = TempDir::new().unwrap();
        let path = write_cutoff_file(dir.path(), &Cutoff::Estimated(5.0))
            .unwrap()
            .unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content, "Estimated score cutoff for acceptance: 5.0000\n");
    }
}
