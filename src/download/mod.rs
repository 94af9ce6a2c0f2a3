//! Reference genome retrieval and taxonomy table generation.
//!
//! This module prepares the reference side of a classification run:
//!
//! - [`GenomeDownloader`]: Fetches assembly summaries and genomes, with caching,
//!   retry and bounded concurrency
//! - [`build_taxonomy_table`]: Writes the `TaxID`/`Identifiers` table the
//!   classifier loads, from a directory of genome FASTA files
//!
//! Downloads are skipped for genomes already present in the output directory,
//! and partially fetched files are never mistaken for complete ones.
//!
//! [`GenomeDownloader`]: genomes::GenomeDownloader
//! [`build_taxonomy_table`]: taxonomy_table::build_taxonomy_table

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::parsing::ParseError;

pub mod client;
pub mod genomes;
pub mod taxonomy_table;

/// Default number of genomes fetched at once
pub const DEFAULT_MAX_CONCURRENT: usize = 64;

/// Default attempts per URL
pub const DEFAULT_RETRIES: u32 = 3;

/// Default connect and per-read timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Timed out reading {url}")]
    Timeout { url: String },

    #[error("Gave up on {url} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Accession {0} not found in assembly summaries")]
    NotInSummary(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Download queue closed: {0}")]
    Queue(#[from] tokio::sync::AcquireError),
}

/// Configuration for the genome downloader
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Where decompressed genomes are written
    pub output_dir: PathBuf,
    /// Where assembly summaries are cached
    pub cache_dir: PathBuf,
    /// Maximum genomes downloaded at once
    pub max_concurrent: usize,
    /// Attempts per URL before giving up
    pub retries: u32,
    /// Connect timeout, and the longest wait for any single read
    pub timeout: Duration,
}

impl DownloadConfig {
    pub fn new(output_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            cache_dir: cache_dir.into(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            retries: DEFAULT_RETRIES,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
