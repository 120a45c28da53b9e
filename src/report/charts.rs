//! PNG chart rendering with plotters
//!
//! Chart text needs a TrueType font registered with plotters. When no font
//! can be found, every chart is still drawn but without titles, tick labels,
//! legends or annotations.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{register_font, FontStyle, FontTransform};

use crate::pipeline::{histogram, histogram_with_range, CorrelationMatrix, Decision, HistogramBin};

pub const DECISION_CHART: &str = "decision_distribution.png";
pub const SCORE_CHART: &str = "score_distribution.png";
pub const HEATMAP_CHART: &str = "correlation_heatmap.png";
pub const CUTOFF_CHART: &str = "score_cutoff_visual.png";

const FONT_FAMILY: &str = "sans-serif";

const DENY_COLOR: RGBColor = RGBColor(214, 39, 40);
const ACCEPT_COLOR: RGBColor = RGBColor(44, 160, 44);
const SCORE_COLOR: RGBColor = RGBColor(31, 119, 180);
const MISSING_CELL_COLOR: RGBColor = RGBColor(200, 200, 200);

/// Font files tried when no font is given explicitly
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONT_SOURCE: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Register the first loadable font under the family used by all charts.
///
/// Registration happens once per process; later calls return the same result.
fn ensure_font(explicit: Option<&Path>) -> Option<PathBuf> {
    FONT_SOURCE
        .get_or_init(|| {
            let candidates = explicit
                .map(Path::to_path_buf)
                .into_iter()
                .chain(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from));

            for path in candidates {
                let bytes = match std::fs::read(&path) {
                    Ok(bytes) => bytes,
                    Err(_) => continue,
                };
                // plotters keeps registered font data for the life of the process
                let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
                match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
                    Ok(()) => {
                        tracing::info!(font = %path.display(), "chart font registered");
                        return Some(path);
                    }
                    Err(_) => tracing::warn!(font = %path.display(), "not a usable TrueType font"),
                }
            }

            tracing::warn!("no chart font found, charts are drawn without text");
            None
        })
        .clone()
}

/// Renders the exploratory charts into an output directory
pub struct ChartRenderer {
    output_dir: PathBuf,
    bins: usize,
    text: bool,
}

impl ChartRenderer {
    /// Create a renderer, registering a chart font if one can be found
    pub fn new(output_dir: &Path, bins: usize, font: Option<&Path>) -> Self {
        let text = ensure_font(font).is_some();
        Self::with_text(output_dir, bins, text)
    }

    /// Create a renderer with chart text explicitly on or off
    pub fn with_text(output_dir: &Path, bins: usize, text: bool) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            bins: bins.max(1),
            text,
        }
    }

    /// Whether charts carry titles, labels and legends
    pub fn has_text(&self) -> bool {
        self.text
    }

    fn builder<'a, 'b, DB: DrawingBackend>(
        &self,
        root: &'a DrawingArea<DB, Shift>,
        title: &str,
    ) -> ChartBuilder<'a, 'b, DB> {
        let mut builder = ChartBuilder::on(root);
        builder.margin(20);
        if self.text {
            builder
                .caption(title, (FONT_FAMILY, 24.0))
                .x_label_area_size(45)
                .y_label_area_size(60);
        }
        builder
    }

    /// Bar chart of Deny/Accept counts
    pub fn decision_distribution(&self, deny: usize, accept: usize) -> Result<PathBuf> {
        let path = self.output_dir.join(DECISION_CHART);
        {
            let root = BitMapBackend::new(&path, (800, 600)).into_drawing_area();
            root.fill(&WHITE)?;

            let peak = deny.max(accept).max(1) as u32;
            let mut chart = self
                .builder(&root, "Decision Distribution")
                .build_cartesian_2d((0u32..1u32).into_segmented(), 0u32..(peak + peak / 10 + 1))?;

            if self.text {
                chart
                    .configure_mesh()
                    .disable_x_mesh()
                    .x_desc("Decision")
                    .y_desc("Count")
                    .x_label_formatter(&decision_tick)
                    .draw()?;
            } else {
                chart.configure_mesh().disable_x_mesh().draw()?;
            }

            chart.draw_series(
                Histogram::vertical(&chart)
                    .style(SCORE_COLOR.filled())
                    .margin(60)
                    .data([(0u32, deny as u32), (1u32, accept as u32)]),
            )?;

            root.present()?;
        }

        tracing::debug!(path = %path.display(), deny, accept, "decision chart written");
        Ok(path)
    }

    /// Histogram of all scores
    pub fn score_distribution(&self, scores: &[f64]) -> Result<PathBuf> {
        let path = self.output_dir.join(SCORE_CHART);
        let bins = histogram(scores, self.bins);
        let (lo, hi) = bin_range(&bins).context("No finite scores to plot")?;
        let peak = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;

        {
            let root = BitMapBackend::new(&path, (900, 600)).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = self
                .builder(&root, "Score Distribution")
                .build_cartesian_2d(lo..hi, 0f64..peak * 1.1)?;

            if self.text {
                chart
                    .configure_mesh()
                    .disable_x_mesh()
                    .x_desc("Score")
                    .y_desc("Count")
                    .y_label_formatter(&|v| format!("{:.0}", v))
                    .draw()?;
            } else {
                chart.configure_mesh().disable_x_mesh().draw()?;
            }

            chart.draw_series(bins.iter().map(|b| {
                Rectangle::new(
                    [(b.start, 0.0), (b.end, b.count as f64)],
                    SCORE_COLOR.mix(0.8).filled(),
                )
            }))?;

            root.present()?;
        }

        tracing::debug!(path = %path.display(), scores = scores.len(), "score chart written");
        Ok(path)
    }

    /// Overlaid score histograms per decision with the cutoff marked
    pub fn score_cutoff_visual(
        &self,
        denied: &[f64],
        accepted: &[f64],
        cutoff: f64,
    ) -> Result<PathBuf> {
        let path = self.output_dir.join(CUTOFF_CHART);

        let (lo, hi) = denied
            .iter()
            .chain(accepted.iter())
            .chain(std::iter::once(&cutoff))
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });
        if lo > hi {
            anyhow::bail!("No finite scores to plot");
        }

        let deny_bins = histogram_with_range(denied, self.bins, lo, hi);
        let accept_bins = histogram_with_range(accepted, self.bins, lo, hi);
        let (lo, hi) = bin_range(&deny_bins).unwrap_or((lo, hi));
        let peak = deny_bins
            .iter()
            .chain(accept_bins.iter())
            .map(|b| b.count)
            .max()
            .unwrap_or(0)
            .max(1) as f64;
        let y_max = peak * 1.15;

        {
            let root = BitMapBackend::new(&path, (1000, 600)).into_drawing_area();
            root.fill(&WHITE)?;

            let title = format!("Score by Decision (cutoff {:.4})", cutoff);
            let mut chart = self
                .builder(&root, &title)
                .build_cartesian_2d(lo..hi, 0f64..y_max)?;

            if self.text {
                chart
                    .configure_mesh()
                    .disable_x_mesh()
                    .x_desc("Score")
                    .y_desc("Count")
                    .y_label_formatter(&|v| format!("{:.0}", v))
                    .draw()?;
            } else {
                chart.configure_mesh().disable_x_mesh().draw()?;
            }

            for (decision, bins, color) in [
                (Decision::Deny, &deny_bins, DENY_COLOR),
                (Decision::Accept, &accept_bins, ACCEPT_COLOR),
            ] {
                let series = chart.draw_series(bins.iter().map(move |b| {
                    Rectangle::new(
                        [(b.start, 0.0), (b.end, b.count as f64)],
                        color.mix(0.5).filled(),
                    )
                }))?;
                if self.text {
                    series.label(decision.label()).legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.mix(0.5).filled())
                    });
                }
            }

            let line = chart.draw_series(LineSeries::new(
                vec![(cutoff, 0.0), (cutoff, y_max)],
                BLACK.stroke_width(2),
            ))?;
            if self.text {
                line.label("Cutoff")
                    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], BLACK.stroke_width(2)));

                chart
                    .configure_series_labels()
                    .position(SeriesLabelPosition::UpperRight)
                    .background_style(&WHITE.mix(0.8))
                    .border_style(&BLACK)
                    .label_font((FONT_FAMILY, 14.0))
                    .draw()?;
            }

            root.present()?;
        }

        tracing::debug!(path = %path.display(), cutoff, "cutoff chart written");
        Ok(path)
    }

    /// Annotated correlation heatmap
    pub fn correlation_heatmap(&self, matrix: &CorrelationMatrix) -> Result<PathBuf> {
        let path = self.output_dir.join(HEATMAP_CHART);
        let n = matrix.len();
        if n == 0 {
            anyhow::bail!("Correlation matrix is empty");
        }

        let (width, height) = (1000i32, 900i32);
        let (left, top, bottom, right) = if self.text {
            (190, 70, 190, 130)
        } else {
            (20, 20, 20, 80)
        };
        let cell = ((width - left - right).min(height - top - bottom) / n as i32).max(1);
        let grid = cell * n as i32;

        {
            let root = BitMapBackend::new(&path, (width as u32, height as u32)).into_drawing_area();
            root.fill(&WHITE)?;

            for i in 0..n {
                for j in 0..n {
                    let value = matrix.get(i, j);
                    let x0 = left + j as i32 * cell;
                    let y0 = top + i as i32 * cell;
                    root.draw(&Rectangle::new(
                        [(x0, y0), (x0 + cell, y0 + cell)],
                        heat_color(value).filled(),
                    ))?;

                    if self.text && cell >= 28 {
                        let label = if value.is_nan() {
                            "n/a".to_string()
                        } else {
                            format!("{:.2}", value)
                        };
                        let ink = if value.abs() > 0.6 { WHITE } else { BLACK };
                        root.draw(&Text::new(
                            label,
                            (x0 + cell / 2, y0 + cell / 2),
                            (FONT_FAMILY, 12.0)
                                .into_font()
                                .color(&ink)
                                .pos(Pos::new(HPos::Center, VPos::Center)),
                        ))?;
                    }
                }
            }

            // Colour bar from -1 (bottom) to +1 (top)
            let bar_x = left + grid + 30;
            let steps = 100;
            for s in 0..steps {
                let value = 1.0 - 2.0 * (s as f64 + 0.5) / steps as f64;
                let y0 = top + s * grid / steps;
                let y1 = top + (s + 1) * grid / steps;
                root.draw(&Rectangle::new(
                    [(bar_x, y0), (bar_x + 20, y1.max(y0 + 1))],
                    heat_color(value).filled(),
                ))?;
            }

            if self.text {
                let title_style = (FONT_FAMILY, 24.0)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Top));
                root.draw(&Text::new(
                    "Correlation Heatmap (top features by |r| with decision)",
                    (width / 2, 20),
                    title_style,
                ))?;

                for (k, name) in matrix.columns.iter().enumerate() {
                    let centre = k as i32 * cell + cell / 2;
                    root.draw(&Text::new(
                        name.as_str(),
                        (left - 8, top + centre),
                        (FONT_FAMILY, 13.0)
                            .into_font()
                            .color(&BLACK)
                            .pos(Pos::new(HPos::Right, VPos::Center)),
                    ))?;
                    root.draw(&Text::new(
                        name.as_str(),
                        (left + centre, top + grid + 8),
                        (FONT_FAMILY, 13.0)
                            .into_font()
                            .transform(FontTransform::Rotate90)
                            .color(&BLACK)
                            .pos(Pos::new(HPos::Left, VPos::Center)),
                    ))?;
                }

                for (label, y) in [("+1", top), ("0", top + grid / 2), ("-1", top + grid)] {
                    root.draw(&Text::new(
                        label,
                        (bar_x + 26, y),
                        (FONT_FAMILY, 12.0)
                            .into_font()
                            .color(&BLACK)
                            .pos(Pos::new(HPos::Left, VPos::Center)),
                    ))?;
                }
            }

            root.present()?;
        }

        tracing::debug!(path = %path.display(), columns = n, "heatmap written");
        Ok(path)
    }
}

fn decision_tick(v: &SegmentValue<u32>) -> String {
    match v {
        SegmentValue::CenterOf(0) => Decision::Deny.label().to_string(),
        SegmentValue::CenterOf(1) => Decision::Accept.label().to_string(),
        _ => String::new(),
    }
}

fn bin_range(bins: &[HistogramBin]) -> Option<(f64, f64)> {
    Some((bins.first()?.start, bins.last()?.end))
}

/// Diverging blue-white-red colour for a correlation in [-1, 1]
pub fn heat_color(value: f64) -> RGBColor {
    if value.is_nan() {
        return MISSING_CELL_COLOR;
    }

    const NEGATIVE: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const NEUTRAL: (f64, f64, f64) = (240.0, 240.0, 240.0);
    const POSITIVE: (f64, f64, f64) = (180.0, 4.0, 38.0);

    let v = value.clamp(-1.0, 1.0);
    let (from, to, t) = if v < 0.0 {
        (NEUTRAL, NEGATIVE, -v)
    } else {
        (NEUTRAL, POSITIVE, v)
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;

    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heat_color_endpoints() {
        assert_eq!(heat_color(1.0), RGBColor(180, 4, 38));
        assert_eq!(heat_color(-1.0), RGBColor(59, 76, 192));
        assert_eq!(heat_color(0.0), RGBColor(240, 240, 240));
        assert_eq!(heat_color(f64::NAN), MISSING_CELL_COLOR);
        assert_eq!(heat_color(3.0), heat_color(1.0));
    }

    #[test]
    fn test_decision_ticks() {
        assert_eq!(decision_tick(&SegmentValue::CenterOf(0)), "Deny");
        assert_eq!(decision_tick(&SegmentValue::CenterOf(1)), "Accept");
        assert_eq!(decision_tick(&SegmentValue::Exact(1)), "");
    }
}
