use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::cli::OutputFormat;
use crate::download::genomes::{download_and_index, DownloadReport};
use crate::download::{DownloadConfig, DEFAULT_MAX_CONCURRENT, DEFAULT_RETRIES};

#[derive(Args)]
pub struct DownloadArgs {
    /// File listing genomes, one accession or genome file name per line
    #[arg(required = true)]
    pub genomes: PathBuf,

    /// Directory for downloaded genomes
    #[arg(required = true)]
    pub output_dir: PathBuf,

    /// Taxonomy table to write for the downloaded genomes
    #[arg(required = true)]
    pub taxonomy: PathBuf,

    /// Directory for cached assembly summaries
    #[arg(required = true)]
    pub cache_dir: PathBuf,

    /// Maximum simultaneous downloads
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT)]
    pub max_concurrent: usize,

    /// Attempts per file before giving up
    #[arg(long, default_value_t = DEFAULT_RETRIES, value_parser = clap::value_parser!(u32).range(1..))]
    pub retries: u32,

    /// Connect and read timeout in seconds
    #[arg(long, default_value = "15")]
    pub timeout: u64,
}

/// Execute download subcommand
///
/// # Errors
///
/// Returns an error if the tokio runtime cannot be created, the assembly
/// summaries are unavailable, or the outputs cannot be written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: DownloadArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut config = DownloadConfig::new(&args.output_dir, &args.cache_dir);
    config.max_concurrent = args.max_concurrent.max(1);
    config.retries = args.retries;
    config.timeout = Duration::from_secs(args.timeout);

    if verbose {
        eprintln!(
            "Downloading with up to {} concurrent transfers, {} attempts each",
            config.max_concurrent, config.retries
        );
    }

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(download_and_index(config, &args.genomes, &args.taxonomy))?;

    match format {
        OutputFormat::Text => print_text_report(&args, &report),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "succeeded": report.succeeded,
                "failed": report.failed,
                "taxonomy": args.taxonomy.display().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn print_text_report(args: &DownloadArgs, report: &DownloadReport) {
    println!("Summary:");
    println!(" - Downloaded successfully: {}", report.succeeded.len());
    println!(" - Failed: {}", report.failed.len());
    for accession in &report.failed {
        println!("     {accession}");
    }
    println!(" - Taxonomy table: {}", args.taxonomy.display());
}
