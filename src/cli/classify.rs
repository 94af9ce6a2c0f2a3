use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::classify::engine::{classify_files, ClassifyConfig, ClassifyInputs};
use crate::classify::report::ClassificationSummary;
use crate::cli::OutputFormat;

#[derive(Args)]
pub struct ClassifyArgs {
    /// Alignment file (PAF or any TSV with query id, query length, reference id
    /// and aligned length in columns 1, 2, 6 and 11)
    #[arg(long, visible_alias = "alignments")]
    pub paf: PathBuf,

    /// Taxonomy table with TaxID and Identifiers columns
    #[arg(long)]
    pub taxonomy: PathBuf,

    /// Hierarchy table with TaxID and Lineage columns
    #[arg(long)]
    pub hierarchy: PathBuf,

    /// Output report (TSV)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of worker threads
    #[arg(long, visible_alias = "threads", default_value = "4", value_parser = clap::value_parser!(u16).range(1..))]
    pub processes: u16,

    /// Maximum candidate lineages per query (clamped to 1-10)
    #[arg(long, default_value = "5", allow_negative_numbers = true)]
    pub max_candidates: i64,
}

/// Execute classify subcommand
///
/// # Errors
///
/// Returns an error if an input cannot be loaded or the report cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ClassifyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = ClassifyConfig::new(usize::from(args.processes), args.max_candidates);

    if verbose {
        eprintln!(
            "Classifying with {} workers, up to {} candidates per query",
            config.workers, config.max_candidates
        );
    }

    let inputs = ClassifyInputs {
        alignments: args.paf.clone(),
        taxonomy: args.taxonomy.clone(),
        hierarchy: args.hierarchy.clone(),
    };

    let summary = classify_files(&inputs, &args.output, config.clone())
        .with_context(|| format!("Classification of {} failed", args.paf.display()))?;

    match format {
        OutputFormat::Text => print_text_summary(&summary),
        OutputFormat::Json => print_json_summary(&summary, &config)?,
    }

    Ok(())
}

fn print_text_summary(summary: &ClassificationSummary) {
    println!("Classification Results");
    println!("{}", "=".repeat(60));
    println!("  Report:      {}", summary.output);
    println!("  Queries:     {}", summary.total);
    println!(
        "  Classified:  {} ({:.1}%)",
        summary.classified,
        summary.rate * 100.0
    );
    println!("  Max candidates per query: {}", summary.max_candidates);
}

fn print_json_summary(summary: &ClassificationSummary, config: &ClassifyConfig) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "summary": summary,
        "config": config,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
