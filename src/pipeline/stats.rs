//! Descriptive statistics, dtype profile and histogram binning

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;

/// Shape and per-dtype column counts of a table
#[derive(Debug, Clone, Serialize)]
pub struct DatasetProfile {
    pub rows: usize,
    pub columns: usize,
    /// (dtype name, number of columns) sorted by count descending
    pub dtype_counts: Vec<(String, usize)>,
}

/// Summarize the shape and column types of a DataFrame
pub fn profile_dataset(df: &DataFrame) -> DatasetProfile {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for col in df.get_columns() {
        *counts.entry(col.dtype().to_string()).or_insert(0) += 1;
    }

    let mut dtype_counts: Vec<(String, usize)> = counts.into_iter().collect();
    dtype_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    DatasetProfile {
        rows: df.height(),
        columns: df.width(),
        dtype_counts,
    }
}

/// Count (deny, accept) rows of an encoded 0/1 decision column.
///
/// Values other than 0 and 1 are not counted.
pub fn decision_counts(df: &DataFrame, column: &str) -> Result<(usize, usize)> {
    let codes = df
        .column(column)
        .with_context(|| format!("Column '{}' not found", column))?
        .cast(&DataType::Int64)?;

    let (mut deny, mut accept) = (0, 0);
    for code in codes.i64()?.into_iter().flatten() {
        match code {
            0 => deny += 1,
            1 => accept += 1,
            _ => {}
        }
    }

    Ok((deny, accept))
}

/// Summary statistics for one numeric column.
///
/// `std` is the sample standard deviation. Statistics are NaN when the
/// column has too few non-null values to define them.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Compute count/mean/std/min/quartiles/max for every numeric column
pub fn describe_numeric(df: &DataFrame) -> Result<Vec<ColumnStats>> {
    let mut stats = Vec::new();

    for col in df.get_columns() {
        if !col.dtype().is_primitive_numeric() {
            continue;
        }

        let mut values = finite_values(col)?;
        values.sort_by(f64::total_cmp);
        stats.push(column_stats(col.name().as_str(), &values));
    }

    Ok(stats)
}

fn column_stats(name: &str, sorted: &[f64]) -> ColumnStats {
    let count = sorted.len();
    let mean = if count > 0 {
        sorted.iter().sum::<f64>() / count as f64
    } else {
        f64::NAN
    };

    let std = if count > 1 {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    } else {
        f64::NAN
    };

    ColumnStats {
        name: name.to_string(),
        count,
        mean,
        std,
        min: sorted.first().copied().unwrap_or(f64::NAN),
        q25: quantile(sorted, 0.25),
        median: quantile(sorted, 0.5),
        q75: quantile(sorted, 0.75),
        max: sorted.last().copied().unwrap_or(f64::NAN),
    }
}

/// Linear-interpolated quantile of already sorted values
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Non-null, finite values of a numeric column as f64
pub fn finite_values(col: &Column) -> Result<Vec<f64>> {
    let floats = col.cast(&DataType::Float64)?;
    Ok(floats
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect())
}

/// A half-open histogram bin `[start, end)`; the last bin also holds `end`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram over the range of the values
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if lo > hi {
        return Vec::new();
    }

    histogram_with_range(values, bins, lo, hi)
}

/// Equal-width histogram over a fixed `[lo, hi]` range.
///
/// Values outside the range or not finite are ignored. A degenerate range
/// widens to a single unit-wide bin centred on the value.
pub fn histogram_with_range(values: &[f64], bins: usize, lo: f64, hi: f64) -> Vec<HistogramBin> {
    let bins = bins.max(1);
    let (lo, hi, bins) = if hi > lo {
        (lo, hi, bins)
    } else {
        (lo - 0.5, hi + 0.5, 1)
    };
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: lo + width * i as f64,
            end: if i + 1 == bins {
                hi
            } else {
                lo + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for &v in values {
        if !v.is_finite() || v < lo || v > hi {
            continue;
        }
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_counts_dtypes() {
        let df = df! {
            "a" => [1i32, 2, 3],
            "b" => [1.0f64, 2.0, 3.0],
            "c" => [4.0f64, 5.0, 6.0],
            "d" => ["x", "y", "z"],
        }
        .unwrap();

        let profile = profile_dataset(&df);
        assert_eq!(profile.rows, 3);
        assert_eq!(profile.columns, 4);
        assert_eq!(profile.dtype_counts[0], ("f64".to_string(), 2));
        assert_eq!(profile.dtype_counts.len(), 3);
    }

    #[test]
    fn test_decision_counts() {
        let df = df! { "decision" => [1i8, 0, 1, 1, 0] }.unwrap();
        assert_eq!(decision_counts(&df, "decision").unwrap(), (2, 3));
        assert!(decision_counts(&df, "missing").is_err());
    }

    #[test]
    fn test_describe_matches_hand_computed_values() {
        let df = df! {
            "x" => [Some(1.0f64), Some(2.0), None, Some(3.0), Some(4.0)],
            "label" => ["a", "b", "c", "d", "e"],
        }
        .unwrap();

        let stats = describe_numeric(&df).unwrap();
        assert_eq!(stats.len(), 1, "String columns are not described");

        let x = &stats[0];
        assert_eq!(x.count, 4);
        assert!((x.mean - 2.5).abs() < 1e-12);
        assert!((x.std - 1.2909944487358056).abs() < 1e-12);
        assert_eq!(x.min, 1.0);
        assert!((x.q25 - 1.75).abs() < 1e-12);
        assert!((x.median - 2.5).abs() < 1e-12);
        assert!((x.q75 - 3.25).abs() < 1e-12);
        assert_eq!(x.max, 4.0);
    }

    #[test]
    fn test_single_value_std_is_nan() {
        let stats = column_stats("one", &[5.0]);
        assert_eq!(stats.mean, 5.0);
        assert!(stats.std.is_nan());
    }

    #[test]
    fn test_histogram_covers_every_value_once() {
        let values: Vec<f64> = (0..100).map(|i| i as f64 * 0.37).collect();
        let bins = histogram(&values, 7);

        assert_eq!(bins.len(), 7);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
        assert_eq!(bins.first().unwrap().start, 0.0);
        assert_eq!(bins.last().unwrap().end, 99.0 * 0.37);
    }

    #[test]
    fn test_histogram_degenerate_range() {
        let bins = histogram(&[3.0, 3.0, 3.0], 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);
        assert!(bins[0].start < 3.0 && bins[0].end > 3.0);
    }

    #[test]
    fn test_histogram_ignores_non_finite() {
        let bins = histogram(&[1.0, f64::NAN, 2.0, f64::INFINITY], 2);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert!(histogram(&[], 5).is_empty());
    }
}
