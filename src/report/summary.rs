//! Terminal tables for the analysis run

use std::path::PathBuf;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{
    ColumnStats, Cutoff, CutoffDiagnostics, DatasetProfile, RatingEncoding, TargetCorrelation,
    NULL_RATING_CODE,
};

fn header(cells: &[&str]) -> Vec<Cell> {
    cells
        .iter()
        .map(|c| Cell::new(c).add_attribute(Attribute::Bold))
        .collect()
}

fn print_section(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn fmt_stat(v: f64) -> String {
    if v.is_nan() {
        "-".to_string()
    } else {
        format!("{:.4}", v)
    }
}

/// Print shape and dtype counts
pub fn print_profile(title: &str, profile: &DatasetProfile) {
    print_section("📐", title);
    println!(
        "      Shape: {} rows x {} columns",
        style(profile.rows).yellow().bold(),
        style(profile.columns).yellow().bold()
    );

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&["Data type", "Columns"]));
    for (dtype, count) in &profile.dtype_counts {
        table.add_row(vec![
            Cell::new(dtype),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }
    print_indented(&table);
}

/// Print the rating category code table
pub fn print_rating_encoding(encoding: &RatingEncoding) {
    print_section("🏷️ ", "RATING CODES");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&["Code", "Raw value"]));
    for (code, raw) in encoding.categories.iter().enumerate() {
        table.add_row(vec![Cell::new(code), Cell::new(raw)]);
    }
    if encoding.null_count > 0 {
        table.add_row(vec![
            Cell::new(NULL_RATING_CODE).fg(Color::Yellow),
            Cell::new(format!("(null, {} rows)", encoding.null_count)).fg(Color::Yellow),
        ]);
    }
    print_indented(&table);
}

/// Print describe-style statistics for numeric columns
pub fn print_statistics(stats: &[ColumnStats]) {
    print_section("📊", "DESCRIPTIVE STATISTICS");

    if stats.is_empty() {
        println!("      No numeric columns");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&[
        "Column", "Count", "Mean", "Std", "Min", "25%", "50%", "75%", "Max",
    ]));

    for s in stats {
        let mut row = vec![Cell::new(&s.name), Cell::new(s.count)];
        row.extend(
            [s.mean, s.std, s.min, s.q25, s.median, s.q75, s.max]
                .iter()
                .map(|v| Cell::new(fmt_stat(*v)).set_alignment(CellAlignment::Right)),
        );
        table.add_row(row);
    }
    print_indented(&table);
}

/// Print the decision correlation ranking
pub fn print_correlations(ranked: &[TargetCorrelation]) {
    print_section("🔗", "CORRELATION WITH DECISION");

    if ranked.is_empty() {
        println!("      Decision has no variance; correlations are undefined");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&["Rank", "Column", "Pearson r", "|r|"]));

    for (rank, entry) in ranked.iter().enumerate() {
        let color = if entry.correlation >= 0.0 {
            Color::Green
        } else {
            Color::Red
        };
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&entry.feature),
            Cell::new(format!("{:+.4}", entry.correlation)).fg(color),
            Cell::new(format!("{:.4}", entry.correlation.abs())),
        ]);
    }
    print_indented(&table);
}

/// Print the cutoff and, when available, how well it separates outcomes
pub fn print_cutoff(cutoff: &Cutoff, diagnostics: Option<&CutoffDiagnostics>) {
    print_section("🎯", "SCORE CUTOFF");

    match cutoff {
        Cutoff::Estimated(v) => println!(
            "      Estimated score cutoff for acceptance: {}",
            style(format!("{:.4}", v)).green().bold()
        ),
        Cutoff::Undefined => println!(
            "      {}",
            style("No accepted application has a score; cutoff undefined").yellow()
        ),
        Cutoff::NotApplicable => println!("      No score column; cutoff not estimated"),
    }

    if let Some(d) = diagnostics {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(header(&["Outcome", "Scored", "At or above cutoff"]));
        table.add_row(vec![
            Cell::new("Accept"),
            Cell::new(d.accepted_total),
            Cell::new(d.accepted_at_or_above),
        ]);
        table.add_row(vec![
            Cell::new("Deny"),
            Cell::new(d.denied_total),
            Cell::new(format!(
                "{} ({:.1}%)",
                d.denied_at_or_above,
                d.denied_above_ratio() * 100.0
            ))
            .fg(if d.denied_at_or_above > 0 {
                Color::Yellow
            } else {
                Color::Green
            }),
        ]);
        print_indented(&table);
    }
}

/// Summary of what the run produced
#[derive(Debug, Default)]
pub struct RunSummary {
    pub rows: usize,
    pub raw_columns: usize,
    pub prepared_columns: usize,
    pub artifacts: Vec<PathBuf>,
    pub skipped: Vec<String>,
}

impl RunSummary {
    pub fn new(rows: usize, raw_columns: usize) -> Self {
        Self {
            rows,
            raw_columns,
            prepared_columns: raw_columns,
            ..Default::default()
        }
    }

    pub fn add_artifact(&mut self, path: PathBuf) {
        self.artifacts.push(path);
    }

    pub fn add_skipped(&mut self, reason: impl Into<String>) {
        self.skipped.push(reason.into());
    }

    pub fn display(&self) {
        print_section("📋", "RUN SUMMARY");

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(header(&["Metric", "Value"]));
        table.add_row(vec![Cell::new("📁 Rows"), Cell::new(self.rows)]);
        table.add_row(vec![
            Cell::new("📥 Raw Columns"),
            Cell::new(self.raw_columns),
        ]);
        table.add_row(vec![
            Cell::new("✅ Prepared Columns"),
            Cell::new(self.prepared_columns)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("🖼️  Artifacts Written"),
            Cell::new(self.artifacts.len()).fg(Color::Cyan),
        ]);
        print_indented(&table);

        if !self.artifacts.is_empty() {
            println!();
            for path in &self.artifacts {
                println!("      {} {}", style("•").dim(), path.display());
            }
        }

        if !self.skipped.is_empty() {
            println!();
            println!("      {}:", style("Skipped").yellow());
            for reason in &self.skipped {
                println!("        {} {}", style("•").dim(), reason);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_stat_nan_placeholder() {
        assert_eq!(fmt_stat(f64::NAN), "-");
        assert_eq!(fmt_stat(1.5), "1.5000");
    }

    #[test]
    fn test_run_summary_tracks_artifacts() {
        let mut summary = RunSummary::new(100, 12);
        summary.prepared_columns = 9;
        summary.add_artifact(PathBuf::from("outputs/decision_distribution.png"));
        summary.add_skipped("score charts (no score column)");

        assert_eq!(summary.artifacts.len(), 1);
        assert_eq!(summary.skipped, vec!["score charts (no score column)"]);
        assert_eq!(summary.prepared_columns, 9);
    }
}
