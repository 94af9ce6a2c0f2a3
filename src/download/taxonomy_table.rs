use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::download::DownloadError;
use crate::parsing::assembly_summary::AssemblySummary;
use crate::parsing::fasta::sequence_names;
use crate::utils::validation::accession_from_name;

/// Taxon id written for genomes missing from the assembly summaries
pub const UNKNOWN_TAXID: &str = "Unknown TaxID";

pub const TAXONOMY_TABLE_HEADER: [&str; 3] = ["GCF", "TaxID", "Identifiers"];

/// One genome's row in the taxonomy table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyTableRow {
    pub accession: String,
    pub taxid: String,
    /// Sequence identifiers found in the genome's FASTA files
    pub identifiers: BTreeSet<String>,
}

/// Scan `genome_dir` for `*.fna` files and build one row per accession.
///
/// Files sharing an accession contribute to the same row. Rows are ordered
/// by accession.
///
/// # Errors
///
/// Returns `DownloadError::Io` if the directory cannot be listed, or
/// `DownloadError::Parse` if a FASTA file cannot be read.
pub fn collect_taxonomy_rows(
    genome_dir: &Path,
    assemblies: &AssemblySummary,
) -> Result<Vec<TaxonomyTableRow>, DownloadError> {
    let mut rows: BTreeMap<String, TaxonomyTableRow> = BTreeMap::new();

    let mut files: Vec<_> = std::fs::read_dir(genome_dir)?
        .collect::<Result<Vec<_>, io::Error>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "fna"))
        .collect();
    files.sort();

    for path in files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let accession = accession_from_name(&file_name);
        let names = sequence_names(&path)?;
        debug!("{}: {} sequences", file_name, names.len());

        let row = rows.entry(accession.clone()).or_insert_with(|| TaxonomyTableRow {
            taxid: assemblies
                .get(&accession)
                .map_or_else(|| UNKNOWN_TAXID.to_string(), |record| record.taxid.clone()),
            accession,
            identifiers: BTreeSet::new(),
        });
        row.identifiers.extend(names);
    }

    Ok(rows.into_values().collect())
}

/// Write taxonomy rows as a tab-delimited table with a header
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_taxonomy_table<W: Write>(writer: &mut W, rows: &[TaxonomyTableRow]) -> io::Result<()> {
    writeln!(writer, "{}", TAXONOMY_TABLE_HEADER.join("\t"))?;
    for row in rows {
        let identifiers: Vec<&str> = row.identifiers.iter().map(String::as_str).collect();
        writeln!(
            writer,
            "{}\t{}\t{}",
            row.accession,
            row.taxid,
            identifiers.join(";")
        )?;
    }
    Ok(())
}

/// Build the taxonomy table for every genome in `genome_dir` and write it to `output`.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns `DownloadError::Io` or `DownloadError::Parse` if the genomes cannot be
/// read or the table cannot be written.
pub fn build_taxonomy_table(
    genome_dir: &Path,
    assemblies: &AssemblySummary,
    output: &Path,
) -> Result<usize, DownloadError> {
    let rows = collect_taxonomy_rows(genome_dir, assemblies)?;

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        write_taxonomy_table(&mut writer, &rows)?;
        writer.flush()?;
    }
    temp.persist(output).map_err(|e| e.error)?;

    info!("Taxonomy table with {} genomes saved to {}", rows.len(), output.display());
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::assembly_summary::AssemblyRecord;
    use crate::parsing::taxonomy::load_taxonomy;
    use tempfile::TempDir;

    fn assemblies() -> AssemblySummary {
        let mut summary = AssemblySummary::new();
        summary.insert(AssemblyRecord {
            accession: "GCF_000005845.2".to_string(),
            asm_name: "ASM584v2".to_string(),
            taxid: "511145".to_string(),
            organism_name: "Escherichia coli str. K-12 substr. MG1655".to_string(),
            ftp_path: "https://example.org/GCF_000005845.2_ASM584v2".to_string(),
        });
        summary
    }

    fn genome_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("GCF_000005845.2_ASM584v2.fna"),
            ">NC_000913.3 Escherichia coli\nACGT\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("GCF_999999999.1_Mystery.fna"),
            ">NZ_B2 second\nAC\n>NZ_A1 first\nGT\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        dir
    }

    #[test]
    fn test_collect_rows() {
        let dir = genome_dir();
        let rows = collect_taxonomy_rows(dir.path(), &assemblies()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].accession, "GCF_000005845.2");
        assert_eq!(rows[0].taxid, "511145");
        assert!(rows[0].identifiers.contains("NC_000913.3"));
        assert_eq!(rows[1].taxid, UNKNOWN_TAXID);
        assert_eq!(rows[1].identifiers.len(), 2);
    }

    #[test]
    fn test_write_table_format() {
        let dir = genome_dir();
        let rows = collect_taxonomy_rows(dir.path(), &assemblies()).unwrap();
        let mut buf = Vec::new();
        write_taxonomy_table(&mut buf, &rows).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "GCF\tTaxID\tIdentifiers");
        assert_eq!(lines[2], "GCF_999999999.1\tUnknown TaxID\tNZ_A1;NZ_B2");
    }

    #[test]
    fn test_table_round_trips_through_loader() {
        let dir = genome_dir();
        let out = TempDir::new().unwrap();
        let table = out.path().join("taxonomy.tsv");

        let count = build_taxonomy_table(dir.path(), &assemblies(), &table).unwrap();
        assert_eq!(count, 2);

        let taxonomy = load_taxonomy(&table).unwrap();
        assert_eq!(taxonomy.taxid("NC_000913.3"), Some("511145"));
        assert_eq!(taxonomy.taxid("NZ_A1"), Some("Unknown TaxID"));
    }
}
