//! Parser for archive assembly summary tables.
//!
//! Assembly summaries are tab-delimited, with `#`-prefixed comment lines
//! (including the column header). The columns used here are:
//!
//! | Column | Field |
//! |--------|-------|
//! | 0  | Assembly accession (e.g. `GCF_000001405.40`) |
//! | 1  | Assembly name |
//! | 5  | Taxon id |
//! | 7  | Organism name |
//! | 19 | FTP path of the assembly directory |

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::parsing::ParseError;

const ACCESSION_COL: usize = 0;
const ASM_NAME_COL: usize = 1;
const TAXID_COL: usize = 5;
const ORGANISM_COL: usize = 7;
const FTP_PATH_COL: usize = 19;

/// Metadata for one assembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyRecord {
    pub accession: String,
    pub asm_name: String,
    pub taxid: String,
    pub organism_name: String,
    /// Assembly directory URL, always `https://`
    pub ftp_path: String,
}

impl AssemblyRecord {
    /// Local file name of the decompressed genome
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}_{}.fna", self.accession, self.asm_name)
    }

    /// URL of the gzipped genomic FASTA inside the assembly directory
    #[must_use]
    pub fn genomic_fna_url(&self) -> String {
        let path = self.ftp_path.trim_end_matches('/');
        let basename = path.rsplit('/').next().unwrap_or(path);
        format!("{path}/{basename}_genomic.fna.gz")
    }
}

/// Assembly records keyed by accession
#[derive(Debug, Clone, Default)]
pub struct AssemblySummary {
    records: HashMap<String, AssemblyRecord>,
}

impl AssemblySummary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record; a later record with the same accession replaces the earlier one
    pub fn insert(&mut self, record: AssemblyRecord) {
        self.records.insert(record.accession.clone(), record);
    }

    /// Fold another summary into this one
    pub fn merge(&mut self, other: AssemblySummary) {
        self.records.extend(other.records);
    }

    #[must_use]
    pub fn get(&self, accession: &str) -> Option<&AssemblyRecord> {
        self.records.get(accession)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load an assembly summary file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read.
pub fn load_assembly_summary(path: &Path) -> Result<AssemblySummary, ParseError> {
    let file = File::open(path)?;
    parse_assembly_summary_reader(BufReader::new(file))
}

/// Parse assembly summary rows.
///
/// Rows with 19 or fewer fields, or an empty FTP path, are skipped.
///
/// # Errors
///
/// Returns `ParseError::Io` if reading fails.
pub fn parse_assembly_summary_reader<R: BufRead>(reader: R) -> Result<AssemblySummary, ParseError> {
    let mut summary = AssemblySummary::new();

    for line in reader.lines() {
        let line = line?;
        if line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.trim().split('\t').collect();
        if fields.len() <= FTP_PATH_COL || fields[FTP_PATH_COL].is_empty() {
            continue;
        }

        summary.insert(AssemblyRecord {
            accession: fields[ACCESSION_COL].to_string(),
            asm_name: fields[ASM_NAME_COL].to_string(),
            taxid: fields[TAXID_COL].to_string(),
            organism_name: fields[ORGANISM_COL].to_string(),
            ftp_path: fields[FTP_PATH_COL].replace("ftp://", "https://"),
        });
    }

    Ok(summary)
}
