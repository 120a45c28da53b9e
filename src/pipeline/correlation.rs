//! Correlation analysis against the decision indicator

use anyhow::{Context, Result};
use faer::Mat;
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;

/// Number of columns shown in the heatmap, the target included
pub const DEFAULT_TOP_CORRELATIONS: usize = 11;

/// Pearson correlation of one column with the target
#[derive(Debug, Clone, Serialize)]
pub struct TargetCorrelation {
    pub feature: String,
    pub correlation: f64,
}

/// Rank numeric columns by absolute Pearson correlation with `target`.
///
/// The target itself is always first (correlation 1.0). Columns whose
/// correlation is undefined (constant or without overlapping values) are
/// left out. At most `top_n` entries are returned. An empty result means
/// the target itself has no variance.
pub fn rank_by_target_correlation(
    df: &DataFrame,
    target: &str,
    top_n: usize,
) -> Result<Vec<TargetCorrelation>> {
    let target_col = df
        .column(target)
        .with_context(|| format!("Target column '{}' not found", target))?;

    if !target_col.dtype().is_primitive_numeric() {
        anyhow::bail!(
            "Target column '{}' must be numeric for correlation ranking, found {}",
            target,
            target_col.dtype()
        );
    }

    let target_values = float_values(target_col)?;
    if pearson(&target_values, &target_values).is_none() {
        return Ok(Vec::new());
    }

    let features = numeric_columns(df)?;
    let mut ranked: Vec<TargetCorrelation> = features
        .par_iter()
        .filter(|(name, _)| name != target)
        .filter_map(|(name, values)| {
            pearson(values, &target_values).map(|c| TargetCorrelation {
                feature: name.clone(),
                correlation: c,
            })
        })
        .collect();

    // Stable sort keeps column order among ties
    ranked.sort_by(|a, b| {
        b.correlation
            .abs()
            .partial_cmp(&a.correlation.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut result = Vec::with_capacity(top_n.min(ranked.len() + 1));
    if top_n > 0 {
        result.push(TargetCorrelation {
            feature: target.to_string(),
            correlation: 1.0,
        });
        result.extend(ranked.into_iter().take(top_n - 1));
    }

    Ok(result)
}

/// Columns for the correlation heatmap.
///
/// Uses the ranking when there is one. When the target has no variance the
/// ranking is empty, so the target is shown with the first numeric columns
/// in table order and its undefined cells stay NaN.
pub fn heatmap_columns(
    df: &DataFrame,
    target: &str,
    ranked: &[TargetCorrelation],
    top_n: usize,
) -> Vec<String> {
    if !ranked.is_empty() {
        return ranked.iter().map(|c| c.feature.clone()).collect();
    }

    let others = df
        .get_columns()
        .iter()
        .filter(|col| col.dtype().is_primitive_numeric() && col.name().as_str() != target)
        .map(|col| col.name().to_string());

    std::iter::once(target.to_string())
        .chain(others)
        .take(top_n.max(1))
        .collect()
}

/// Square Pearson correlation matrix over a fixed list of columns
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Mat<f64>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Correlation between columns `i` and `j`; NaN when undefined
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[(i, j)]
    }
}

/// Pairwise-complete Pearson correlation matrix for the named columns
pub fn correlation_matrix(df: &DataFrame, columns: &[String]) -> Result<CorrelationMatrix> {
    let data: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|name| {
            df.column(name)
                .with_context(|| format!("Column '{}' not found", name))
                .and_then(float_values)
        })
        .collect::<Result<_>>()?;

    let n = columns.len();
    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| (i..n).map(move |j| (i, j)))
        .collect();

    let computed: Vec<(usize, usize, f64)> = pairs
        .par_iter()
        .map(|&(i, j)| {
            let corr = pearson(&data[i], &data[j]).unwrap_or(f64::NAN);
            (i, j, corr)
        })
        .collect();

    let mut values = Mat::<f64>::zeros(n, n);
    for (i, j, corr) in computed {
        // Self-correlation is exactly 1 whenever it is defined
        let corr = if i == j && !corr.is_nan() { 1.0 } else { corr };
        values[(i, j)] = corr;
        values[(j, i)] = corr;
    }

    Ok(CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    })
}

/// Numeric columns cast to f64 with NaN treated as missing
fn numeric_columns(df: &DataFrame) -> Result<Vec<(String, Vec<Option<f64>>)>> {
    df.get_columns()
        .iter()
        .filter(|col| col.dtype().is_primitive_numeric())
        .map(|col| Ok((col.name().to_string(), float_values(col)?)))
        .collect()
}

fn float_values(col: &Column) -> Result<Vec<Option<f64>>> {
    let floats = col.cast(&DataType::Float64)?;
    Ok(floats
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Pearson correlation over rows where both values are present.
///
/// Single-pass Welford accumulation. Returns `None` when fewer than two
/// complete rows exist or either side has zero variance.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    if x.len() != y.len() {
        return None;
    }

    let mut n = 0.0;
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov_xy = 0.0;

    for (a, b) in x.iter().zip(y.iter()) {
        if let (Some(a), Some(b)) = (a, b) {
            n += 1.0;
            let dx = a - mean_x;
            let dy = b - mean_y;
            mean_x += dx / n;
            mean_y += dy / n;
            var_x += dx * (a - mean_x);
            var_y += dy * (b - mean_y);
            cov_xy += dx * (b - mean_y);
        }
    }

    if n < 2.0 || var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }

    let r = cov_xy / (var_x.sqrt() * var_y.sqrt());
    Some(r.clamp(-1.0, 1.0))
}
