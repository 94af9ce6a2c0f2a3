//! Command-line interface for taxa-consensus.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **classify**: Assign lineages to queries from their alignments
//! - **build-taxonomy**: Write a taxonomy table from a directory of genomes
//! - **download**: Fetch reference genomes and build their taxonomy table
//!
//! ## Usage
//!
//! ```text
//! # Classify alignments, keeping up to 3 candidates per query
//! taxa-consensus classify --paf reads.paf --taxonomy taxonomy.tsv \
//!     --hierarchy hierarchy.tsv --output report.tsv --max-candidates 3
//!
//! # JSON summary for scripting
//! taxa-consensus --format json classify ...
//!
//! # Download genomes listed in genomes.txt
//! taxa-consensus download genomes.txt genomes/ taxonomy.tsv cache/
//! ```

use clap::{Parser, Subcommand};

pub mod build_taxonomy;
pub mod classify;
pub mod download;

#[derive(Parser)]
#[command(name = "taxa-consensus")]
#[command(version)]
#[command(about = "Confidence-weighted taxonomic classification of sequence alignments")]
#[command(
    long_about = "taxa-consensus assigns a lineage to every query in an alignment file.\n\nInstead of trusting the single best hit it weighs every hit by its coverage and by how often the reference is hit across the whole input, then reports up to K lineages ranked by confidence. Exact self-hits are reported directly with full confidence."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Format of the summary printed to stdout
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify queries from an alignment file
    Classify(classify::ClassifyArgs),

    /// Build a taxonomy table from downloaded genomes
    BuildTaxonomy(build_taxonomy::BuildTaxonomyArgs),

    /// Download reference genomes listed by accession
    Download(download::DownloadArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
