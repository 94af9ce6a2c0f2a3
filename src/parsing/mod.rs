//! Parsers for the tabular inputs of the classifier.
//!
//! This module provides parsers for:
//!
//! - **Alignment records** (PAF-like): per-query hits and reference abundance
//! - **Taxonomy tables**: reference identifier → taxon id
//! - **Hierarchy tables**: taxon id → lineage
//! - **FASTA files**: sequence identifiers for building taxonomy tables
//! - **Assembly summaries**: archive metadata used by the genome downloader
//!
//! ## Alignment columns
//!
//! | Column | Field | Required |
//! |--------|-------|----------|
//! | 0  | Query id | Yes |
//! | 1  | Query length | Yes |
//! | 5  | Reference id | Yes |
//! | 10 | Aligned block length | Yes |
//!
//! Lines with fewer than 11 fields are skipped. Extra fields are ignored.

use thiserror::Error;

pub mod alignment;
pub mod assembly_summary;
pub mod fasta;
pub mod taxonomy;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing required column '{column}' in {source_name}")]
    MissingColumn { column: String, source_name: String },

    #[error("noodles error: {0}")]
    Noodles(String),
}
