//! Sequence identifier extraction from FASTA files using noodles.
//!
//! Files ending in `.gz` are read through a multi-member gzip decoder.

use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;

use crate::parsing::ParseError;

#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    path.to_string_lossy().to_lowercase().ends_with(".gz")
}

/// Read the name of every sequence in a FASTA file.
///
/// The name is the first whitespace-delimited word of the definition line.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read or `ParseError::Noodles`
/// if a record is malformed.
pub fn sequence_names(path: &Path) -> Result<Vec<String>, ParseError> {
    let file = std::fs::File::open(path)?;
    if is_gzipped(path) {
        let mut reader = fasta::io::Reader::new(BufReader::new(MultiGzDecoder::new(file)));
        sequence_names_from_reader(&mut reader)
    } else {
        let mut reader = fasta::io::Reader::new(BufReader::new(file));
        sequence_names_from_reader(&mut reader)
    }
}

/// Read sequence names from a noodles FASTA reader
pub fn sequence_names_from_reader<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
) -> Result<Vec<String>, ParseError> {
    let mut names = Vec::new();

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;
        names.push(String::from_utf8_lossy(record.name()).to_string());
    }

    Ok(names)
}
