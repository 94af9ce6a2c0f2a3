//! Alignment-based taxonomic classification.
//!
//! - [`ClassificationEngine`]: Classifies queries on a worker pool
//! - [`gather_evidence`]: Exact-match shortcut or weighted consensus for one query
//! - [`rank_lineages`]: Ranks weighted taxa into lineage candidates
//! - [`ClassificationSummary`]: Totals for a finished run
//!
//! ## Algorithm
//!
//! 1. **Exact match**: the first hit whose reference equals the query id, with
//!    coverage ≥ 0.99 and a known taxon, is authoritative when its taxon has a
//!    lineage. It is reported alone with confidence 1.0.
//! 2. **Weighting**: otherwise each hit with a known reference adds
//!    `coverage × abundance(reference)` to its taxon, where abundance is the number
//!    of alignment records citing the reference across the whole input.
//! 3. **Ranking**: confidence is the taxon's share of the total weight. Taxa with a
//!    lineage are sorted by descending confidence (ties by ascending taxon id) and
//!    the first K are kept.
//!
//! A query with no usable evidence gets the single candidate `Unknown` at
//! rank `root` with confidence 0.
//!
//! [`ClassificationEngine`]: engine::ClassificationEngine
//! [`gather_evidence`]: evidence::gather_evidence
//! [`rank_lineages`]: ranker::rank_lineages
//! [`ClassificationSummary`]: report::ClassificationSummary

use std::path::PathBuf;

use thiserror::Error;

use crate::parsing::ParseError;

pub mod engine;
pub mod evidence;
pub mod ranker;
pub mod report;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Failed to load {input} from {}: {source}", path.display())]
    Load {
        input: &'static str,
        path: PathBuf,
        source: ParseError,
    },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to write report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        source: std::io::Error,
    },
}
