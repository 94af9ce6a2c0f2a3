use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::core::hit::{QueryHit, QueryHitSet, ReferenceAbundance};
use crate::parsing::ParseError;

/// Minimum number of tab-separated fields in a usable alignment record
pub const MIN_ALIGNMENT_FIELDS: usize = 11;

const QUERY_ID_COL: usize = 0;
const QUERY_LENGTH_COL: usize = 1;
const REFERENCE_ID_COL: usize = 5;
const ALIGNED_LENGTH_COL: usize = 10;

/// Everything a single pass over the alignment records produces
#[derive(Debug, Default)]
pub struct AlignmentIndex {
    /// Hits per query, in encounter order
    pub hits: QueryHitSet,

    /// Records per reference across the whole input
    pub abundance: ReferenceAbundance,

    /// Lines skipped for being short or carrying non-integer lengths
    pub skipped_lines: usize,
}

impl AlignmentIndex {
    /// Record one alignment: append the hit and count the reference
    pub fn record(
        &mut self,
        query_id: &str,
        query_length: u64,
        reference_id: &str,
        aligned_length: u64,
    ) {
        let hit = QueryHit::from_alignment(query_id, query_length, reference_id, aligned_length);
        self.hits.push(query_id, hit);
        self.abundance.increment(reference_id);
    }
}

/// Parse an alignment file into per-query hits and reference abundance.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened or read. Malformed
/// records are skipped, never fatal.
pub fn parse_alignment_file(path: &Path) -> Result<AlignmentIndex, ParseError> {
    let file = File::open(path)?;
    let index = parse_alignment_reader(BufReader::new(file))?;

    info!(
        "Processed {} queries from {}",
        index.hits.len(),
        path.display()
    );
    Ok(index)
}

/// Parse alignment records from any buffered reader.
///
/// # Errors
///
/// Returns `ParseError::Io` if reading fails.
pub fn parse_alignment_reader<R: BufRead>(reader: R) -> Result<AlignmentIndex, ParseError> {
    let mut index = AlignmentIndex::default();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_num = i + 1;

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < MIN_ALIGNMENT_FIELDS {
            debug!("Skipping line {line_num}: {} fields", fields.len());
            index.skipped_lines += 1;
            continue;
        }

        let (Some(query_length), Some(aligned_length)) = (
            parse_length(fields[QUERY_LENGTH_COL]),
            parse_length(fields[ALIGNED_LENGTH_COL]),
        ) else {
            warn!("Skipping line {line_num}: query or aligned length is not an integer");
            index.skipped_lines += 1;
            continue;
        };

        index.record(
            fields[QUERY_ID_COL],
            query_length,
            fields[REFERENCE_ID_COL],
            aligned_length,
        );
    }

    if index.skipped_lines > 0 {
        debug!("Skipped {} malformed alignment lines", index.skipped_lines);
    }

    Ok(index)
}

fn parse_length(field: &str) -> Option<u64> {
    field.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn paf_line(query: &str, qlen: u64, reference: &str, alen: u64) -> String {
        format!("{query}\t{qlen}\t0\t{alen}\t+\t{reference}\t5000\t0\t{alen}\t{alen}\t{alen}\t60\n")
    }

    #[test]
    fn test_parse_records_and_abundance() {
        let text = [
            paf_line("Q1", 1000, "NC_001", 990),
            paf_line("Q1", 1000, "NC_002", 500),
            paf_line("Q2", 200, "NC_001", 100),
        ]
        .concat();

        let index = parse_alignment_reader(text.as_bytes()).unwrap();
        assert_eq!(index.hits.len(), 2);
        assert_eq!(index.abundance.get("NC_001"), Some(2));
        assert_eq!(index.abundance.get("NC_002"), Some(1));

        let q1 = index.hits.get("Q1").unwrap();
        assert_eq!(q1.len(), 2);
        assert_eq!(q1[0].reference_id, "NC_001");
        assert!((q1[1].coverage - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_short_lines_are_skipped() {
        let text = format!(
            "Q1\t1000\t0\t10\n\n{}",
            paf_line("Q2", 100, "R1", 100)
        );
        let index = parse_alignment_reader(text.as_bytes()).unwrap();
        assert_eq!(index.hits.len(), 1);
        assert_eq!(index.skipped_lines, 2);
        assert!(index.hits.get("Q1").is_none());
    }

    #[test]
    fn test_non_integer_lengths_are_skipped() {
        let text = "Q1\tabc\t*\t*\t*\tR1\t*\t*\t*\t*\t990\n";
        let index = parse_alignment_reader(text.as_bytes()).unwrap();
        assert!(index.hits.is_empty());
        assert!(index.abundance.is_empty());
        assert_eq!(index.skipped_lines, 1);
    }

    #[test]
    fn test_placeholder_columns_accepted() {
        let text = "Q1\t1000\t*\t*\t*\tNC_001\t*\t*\t*\t*\t990\n";
        let index = parse_alignment_reader(text.as_bytes()).unwrap();
        let hits = index.hits.get("Q1").unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].coverage - 0.99).abs() < 1e-12);
        assert!(!hits[0].is_exact);
    }

    #[test]
    fn test_self_hit_is_exact() {
        let text = paf_line("NC_009", 1000, "NC_009", 1000);
        let index = parse_alignment_reader(text.as_bytes()).unwrap();
        assert!(index.hits.get("NC_009").unwrap()[0].is_exact);
    }

    #[test]
    fn test_parse_alignment_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(paf_line("Q1", 100, "R1", 50).as_bytes())
            .unwrap();
        file.flush().unwrap();

        let index = parse_alignment_file(file.path()).unwrap();
        assert_eq!(index.hits.len(), 1);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = parse_alignment_file(Path::new("/nonexistent/alignments.paf"));
        assert!(matches!(result, Err(ParseError::Io(_))));
    }
}
