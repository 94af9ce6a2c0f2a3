//! Loaders for the taxonomy and hierarchy tables.
//!
//! Both tables are tab-delimited with a header line naming their columns.
//! Columns are located by name, so extra columns (such as the `GCF` column
//! written by the taxonomy table builder) are ignored.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::info;

use crate::parsing::ParseError;

pub const TAXID_COLUMN: &str = "TaxID";
pub const IDENTIFIERS_COLUMN: &str = "Identifiers";
pub const LINEAGE_COLUMN: &str = "Lineage";

/// Reference identifier → taxon id
#[derive(Debug, Clone, Default)]
pub struct TaxonomyMapping {
    taxa: HashMap<String, String>,
}

impl TaxonomyMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map an identifier to a taxon; a later insert for the same identifier wins
    pub fn insert(&mut self, identifier: impl Into<String>, taxid: impl Into<String>) {
        self.taxa.insert(identifier.into(), taxid.into());
    }

    #[must_use]
    pub fn taxid(&self, identifier: &str) -> Option<&str> {
        self.taxa.get(identifier).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.taxa.contains_key(identifier)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.taxa.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.taxa.is_empty()
    }
}

/// Taxon id → lineage string
#[derive(Debug, Clone, Default)]
pub struct HierarchyMapping {
    lineages: HashMap<String, String>,
}

impl HierarchyMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, taxid: impl Into<String>, lineage: impl Into<String>) {
        self.lineages.insert(taxid.into(), lineage.into());
    }

    #[must_use]
    pub fn lineage(&self, taxid: &str) -> Option<&str> {
        self.lineages.get(taxid).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lineages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lineages.is_empty()
    }
}

/// Column positions resolved from a header line
struct HeaderColumns {
    positions: HashMap<String, usize>,
    source_name: String,
}

impl HeaderColumns {
    fn parse(header: &str, source_name: &str) -> Self {
        let positions = header
            .split('\t')
            .enumerate()
            .map(|(idx, col)| (col.trim().to_string(), idx))
            .collect();

        Self {
            positions,
            source_name: source_name.to_string(),
        }
    }

    fn require(&self, column: &str) -> Result<usize, ParseError> {
        self.positions
            .get(column)
            .copied()
            .ok_or_else(|| ParseError::MissingColumn {
                column: column.to_string(),
                source_name: self.source_name.clone(),
            })
    }
}

/// Read the header line and resolve two required columns.
///
/// An empty input has no header, so every required column is missing.
fn read_header<R: BufRead>(
    lines: &mut std::io::Lines<R>,
    source_name: &str,
    first: &str,
    second: &str,
) -> Result<(usize, usize), ParseError> {
    let header = lines.next().transpose()?.unwrap_or_default();
    let columns = HeaderColumns::parse(&header, source_name);
    Ok((columns.require(first)?, columns.require(second)?))
}

/// Load a taxonomy table (`TaxID`, `Identifiers`).
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::MissingColumn` if a required column is absent from the header.
pub fn load_taxonomy(path: &Path) -> Result<TaxonomyMapping, ParseError> {
    let file = File::open(path)?;
    let taxonomy = parse_taxonomy_reader(BufReader::new(file), &path.display().to_string())?;
    info!("Loaded {} taxonomy mappings", taxonomy.len());
    Ok(taxonomy)
}

/// Parse a taxonomy table from a reader.
///
/// `Identifiers` is a `;`-separated list; each trimmed, non-empty identifier
/// becomes its own key. Rows too short to hold both columns are skipped.
///
/// # Errors
///
/// Returns `ParseError::Io` on read failure or `ParseError::MissingColumn`.
pub fn parse_taxonomy_reader<R: BufRead>(
    reader: R,
    source_name: &str,
) -> Result<TaxonomyMapping, ParseError> {
    let mut lines = reader.lines();
    let (taxid_idx, ids_idx) =
        read_header(&mut lines, source_name, TAXID_COLUMN, IDENTIFIERS_COLUMN)?;

    let mut taxonomy = TaxonomyMapping::new();
    for line in lines {
        let line = line?;
        let fields: Vec<&str> = line.split('\t').collect();
        let (Some(taxid), Some(identifiers)) = (fields.get(taxid_idx), fields.get(ids_idx)) else {
            continue;
        };

        let taxid = taxid.trim();
        for identifier in identifiers.split(';').map(str::trim) {
            if !identifier.is_empty() {
                taxonomy.insert(identifier, taxid);
            }
        }
    }

    Ok(taxonomy)
}

/// Load a hierarchy table (`TaxID`, `Lineage`).
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::MissingColumn` if a required column is absent from the header.
pub fn load_hierarchy(path: &Path) -> Result<HierarchyMapping, ParseError> {
    let file = File::open(path)?;
    let hierarchy = parse_hierarchy_reader(BufReader::new(file), &path.display().to_string())?;
    info!("Loaded {} taxonomy hierarchies", hierarchy.len());
    Ok(hierarchy)
}

/// Parse a hierarchy table from a reader. Lineages are trimmed.
///
/// # Errors
///
/// Returns `ParseError::Io` on read failure or `ParseError::MissingColumn`.
pub fn parse_hierarchy_reader<R: BufRead>(
    reader: R,
    source_name: &str,
) -> Result<HierarchyMapping, ParseError> {
    let mut lines = reader.lines();
    let (taxid_idx, lineage_idx) =
        read_header(&mut lines, source_name, TAXID_COLUMN, LINEAGE_COLUMN)?;

    let mut hierarchy = HierarchyMapping::new();
    for line in lines {
        let line = line?;
        let fields: Vec<&str> = line.split('\t').collect();
        if let (Some(taxid), Some(lineage)) = (fields.get(taxid_idx), fields.get(lineage_idx)) {
            hierarchy.insert(taxid.trim(), lineage.trim());
        }
    }

    Ok(hierarchy)
}
