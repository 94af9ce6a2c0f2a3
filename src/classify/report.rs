//! Report writing and run summary.
//!
//! The report is tab-delimited with one row per (query, candidate):
//!
//! ```text
//! Query   Confidence  Lineage                                  Taxonomic Level
//! Q1      1.0000      superkingdom:Eukaryota;species:Homo sapiens  species
//! ```

use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::classify::ClassifyError;
use crate::core::candidate::ClassificationResult;

pub const REPORT_HEADER: [&str; 4] = ["Query", "Confidence", "Lineage", "Taxonomic Level"];

/// Counts describing a finished classification run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationSummary {
    /// Queries with at least one alignment record
    pub total: usize,
    /// Queries whose top candidate is not "Unknown"
    pub classified: usize,
    /// `classified / total`, 0 when there are no queries
    pub rate: f64,
    pub max_candidates: usize,
    pub output: String,
}

impl ClassificationSummary {
    #[must_use]
    pub fn from_results(
        results: &[ClassificationResult],
        max_candidates: usize,
        output: &Path,
    ) -> Self {
        let total = results.len();
        let classified = results.iter().filter(|r| r.is_classified()).count();
        #[allow(clippy::cast_precision_loss)]
        let rate = if total == 0 {
            0.0
        } else {
            classified as f64 / total as f64
        };

        Self {
            total,
            classified,
            rate,
            max_candidates,
            output: output.display().to_string(),
        }
    }
}

/// Write report rows for every result, at most `max_candidates` per query.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_report_to<W: Write>(
    writer: &mut W,
    results: &[ClassificationResult],
    max_candidates: usize,
) -> io::Result<()> {
    writeln!(writer, "{}", REPORT_HEADER.join("\t"))?;

    for result in results {
        for candidate in result.candidates.iter().take(max_candidates) {
            writeln!(
                writer,
                "{}\t{:.4}\t{}\t{}",
                result.query_id, candidate.confidence, candidate.lineage, candidate.rank_level
            )?;
        }
    }

    Ok(())
}

/// Write the report to `path` atomically.
///
/// Rows go to a temporary file next to `path`, which is renamed into place
/// only after everything has been flushed.
///
/// # Errors
///
/// Returns `ClassifyError::Report` if the file cannot be created, written or renamed.
pub fn write_report(
    path: &Path,
    results: &[ClassificationResult],
    max_candidates: usize,
) -> Result<(), ClassifyError> {
    let report_err = |source: io::Error| ClassifyError::Report {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = NamedTempFile::new_in(dir).map_err(report_err)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        write_report_to(&mut writer, results, max_candidates).map_err(report_err)?;
        writer.flush().map_err(report_err)?;
    }
    temp.persist(path).map_err(|e| report_err(e.error))?;

    Ok(())
}
