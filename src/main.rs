//! loaneda: Loan Decision Exploratory Analysis CLI
//!
//! Loads the raw loan table, prepares it, prints descriptive statistics and
//! writes the exploratory charts and the score cutoff file.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use loaneda::cli::Cli;
use loaneda::pipeline::{
    correlation_matrix, cutoff_diagnostics, decision_counts, describe_numeric, estimate_cutoff,
    heatmap_columns, load_dataset_with_progress, prepare_dataset, profile_dataset,
    rank_by_target_correlation, scored_rows, Cutoff, DECISION_COLUMN,
};
use loaneda::report::{
    export_eda_summary, print_correlations, print_cutoff, print_profile, print_rating_encoding,
    print_statistics, write_cutoff_file, ChartRenderer, ExportParams, RunSummary,
    EDA_SUMMARY_FILE,
};
use loaneda::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_config, print_info, print_step_header, print_step_time, print_success, print_warning,
};

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "loaneda=info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&cli.input, &cli.output_dir, cli.top_correlations, cli.bins);

    // Step 1: Load dataset
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let (raw, rows, cols, memory_mb) =
        load_dataset_with_progress(&cli.input, cli.infer_schema_length)?;

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);

    let raw_profile = profile_dataset(&raw);
    let mut summary = RunSummary::new(rows, cols);
    print_step_time(step_start.elapsed());

    // Step 2: Prepare
    print_step_header(2, "Prepare Dataset");
    let step_start = Instant::now();
    let prepared = prepare_dataset(&raw)
        .with_context(|| format!("Failed to prepare dataset {}", cli.input.display()))?;
    drop(raw);
    let df = &prepared.frame;
    print_success("Dropped identifier columns, encoded decision and rating");

    let prepared_profile = profile_dataset(df);
    summary.prepared_columns = prepared_profile.columns;
    print_profile("CLEANED DATASET", &prepared_profile);
    print_rating_encoding(&prepared.rating_encoding);

    println!();
    println!("    {} {}", style("🔍").cyan(), style("SAMPLE ROWS").white().bold());
    println!("{}", df.head(Some(5)));
    print_step_time(step_start.elapsed());

    // Step 3: Descriptive statistics and correlation with decision
    print_step_header(3, "Describe");
    let step_start = Instant::now();
    let statistics = describe_numeric(df)?;
    print_statistics(&statistics);

    let ranked = rank_by_target_correlation(df, DECISION_COLUMN, cli.top_correlations)?;
    print_correlations(&ranked);
    print_step_time(step_start.elapsed());

    // Step 4: Score cutoff
    print_step_header(4, "Score Cutoff");
    let step_start = Instant::now();
    let cutoff = estimate_cutoff(df)?;
    let scored = scored_rows(df)?;
    let diagnostics = match (cutoff.value(), scored.as_ref()) {
        (Some(value), Some(rows)) => Some(cutoff_diagnostics(rows, value)),
        _ => None,
    };

    match cutoff {
        Cutoff::Undefined => tracing::warn!("no accepted application has a score"),
        Cutoff::NotApplicable => print_info("No 'score' column; score analyses are skipped"),
        Cutoff::Estimated(_) => {}
    }
    print_cutoff(&cutoff, diagnostics.as_ref());
    print_step_time(step_start.elapsed());

    // Step 5: Write artifacts
    print_step_header(5, "Write Outputs");
    let step_start = Instant::now();
    std::fs::create_dir_all(&cli.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            cli.output_dir.display()
        )
    })?;

    let renderer = ChartRenderer::new(&cli.output_dir, cli.bins, cli.font.as_deref());
    if !renderer.has_text() {
        print_warning("No chart font found; charts are drawn without text (see --font)");
    }

    let spinner = create_spinner("Rendering charts...");

    let (deny, accept) = decision_counts(df, DECISION_COLUMN)?;
    summary.add_artifact(renderer.decision_distribution(deny, accept)?);

    match scored.as_ref() {
        Some(rows) => {
            let scores = rows.all_scores();
            if scores.is_empty() {
                summary.add_skipped("score distribution (no finite scores)");
            } else {
                summary.add_artifact(renderer.score_distribution(&scores)?);
            }
        }
        None => summary.add_skipped("score distribution (no score column)"),
    }

    if ranked.is_empty() {
        tracing::warn!("decision has no variance, heatmap cells involving it are undefined");
    }
    let columns = heatmap_columns(df, DECISION_COLUMN, &ranked, cli.top_correlations);
    let matrix = correlation_matrix(df, &columns)?;
    summary.add_artifact(renderer.correlation_heatmap(&matrix)?);

    match (cutoff, scored.as_ref()) {
        (Cutoff::Estimated(value), Some(rows)) => {
            summary.add_artifact(renderer.score_cutoff_visual(
                &rows.scores_for(0),
                &rows.scores_for(1),
                value,
            )?);
        }
        (Cutoff::Undefined, _) => summary.add_skipped("score cutoff chart (cutoff undefined)"),
        _ => summary.add_skipped("score cutoff chart (no score column)"),
    }

    if summary.skipped.is_empty() {
        finish_with_success(&spinner, "Charts rendered");
    } else {
        finish_with_warning(&spinner, "Charts rendered, some skipped");
    }

    if let Some(path) = write_cutoff_file(&cli.output_dir, &cutoff)? {
        summary.add_artifact(path);
    }

    if cli.export_json {
        let path = cli.artifact_path(EDA_SUMMARY_FILE);
        let input_file = cli.input.display().to_string();
        export_eda_summary(
            &path,
            &ExportParams {
                input_file: &input_file,
                raw_profile: &raw_profile,
                prepared_profile: &prepared_profile,
                rating_encoding: &prepared.rating_encoding,
                statistics: &statistics,
                decision_correlations: &ranked,
                cutoff,
                cutoff_diagnostics: diagnostics,
            },
        )?;
        summary.add_artifact(path);
    }
    print_step_time(step_start.elapsed());

    summary.display();
    print_completion();

    Ok(())
}
