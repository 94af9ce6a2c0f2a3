use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::download::taxonomy_table::build_taxonomy_table;
use crate::parsing::assembly_summary::{load_assembly_summary, AssemblySummary};

#[derive(Args)]
pub struct BuildTaxonomyArgs {
    /// Directory containing genome FASTA files (*.fna)
    #[arg(required = true)]
    pub genome_dir: PathBuf,

    /// Output taxonomy table (TSV)
    #[arg(required = true)]
    pub output: PathBuf,

    /// Assembly summary file(s) used to look up taxon ids; later files win
    #[arg(short, long = "summary")]
    pub summaries: Vec<PathBuf>,
}

/// Execute build-taxonomy subcommand
///
/// # Errors
///
/// Returns an error if a summary or genome cannot be read or the table cannot be written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: BuildTaxonomyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut assemblies = AssemblySummary::new();
    for path in &args.summaries {
        let summary = load_assembly_summary(path)
            .with_context(|| format!("Failed to read assembly summary {}", path.display()))?;
        if verbose {
            eprintln!("{}: {} assemblies", path.display(), summary.len());
        }
        assemblies.merge(summary);
    }

    let rows = build_taxonomy_table(&args.genome_dir, &assemblies, &args.output)
        .with_context(|| format!("Failed to build taxonomy table from {}", args.genome_dir.display()))?;

    match format {
        OutputFormat::Text => {
            println!("Wrote {rows} genomes to {}", args.output.display());
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "genomes": rows,
                "output": args.output.display().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
