//! # taxa-consensus
//!
//! A library for assigning taxonomic lineages to sequences from their alignments.
//!
//! Aligners report many hits per query. Picking the single best hit throws away
//! most of that evidence and is easily fooled by a reference that happens to
//! align well. `taxa-consensus` instead builds a confidence-weighted consensus
//! over every hit of a query.
//!
//! ## Features
//!
//! - **Exact-match shortcut**: A near-complete self-hit settles a query outright
//! - **Abundance weighting**: Hits count by coverage × how often their reference is hit overall
//! - **Ranked candidates**: Up to K lineages per query, each with a confidence
//! - **Rank resolution**: Names the deepest rank present in each lineage
//! - **Parallel**: Queries are classified independently on a worker pool
//! - **Reference preparation**: Download genomes and build the taxonomy table
//!
//! ## Example
//!
//! ```rust
//! use taxa_consensus::classify::engine::{ClassificationEngine, ClassifyConfig};
//! use taxa_consensus::parsing::alignment::parse_alignment_reader;
//! use taxa_consensus::parsing::taxonomy::{HierarchyMapping, TaxonomyMapping};
//!
//! let mut taxonomy = TaxonomyMapping::new();
//! taxonomy.insert("NC_001", "9606");
//! let mut hierarchy = HierarchyMapping::new();
//! hierarchy.insert("9606", "superkingdom:Eukaryota;species:Homo sapiens");
//!
//! let paf = "Q1\t1000\t0\t990\t+\tNC_001\t5000\t0\t990\t990\t990\t60\n";
//! let alignments = parse_alignment_reader(paf.as_bytes()).unwrap();
//!
//! let engine = ClassificationEngine::new(
//!     &taxonomy,
//!     &hierarchy,
//!     &alignments.abundance,
//!     ClassifyConfig::default(),
//! );
//! let results = engine.classify_all(alignments.hits).unwrap();
//!
//! assert_eq!(results[0].candidates[0].rank_level, "species");
//! assert!((results[0].candidates[0].confidence - 1.0).abs() < 1e-12);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Hits, candidates and the rank scale
//! - [`parsing`]: Alignment, taxonomy, hierarchy, FASTA and assembly summary parsers
//! - [`classify`]: Evidence aggregation, ranking, the worker pool and the report
//! - [`download`]: Genome retrieval and taxonomy table generation
//! - [`cli`]: Command-line interface implementation

pub mod classify;
pub mod cli;
pub mod core;
pub mod download;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use classify::engine::{ClassificationEngine, ClassifyConfig};
pub use classify::report::ClassificationSummary;
pub use core::candidate::{ClassificationCandidate, ClassificationResult};
pub use core::hit::{QueryHit, QueryHitSet, ReferenceAbundance};
pub use core::rank::{resolve_level, Rank};
pub use parsing::taxonomy::{HierarchyMapping, TaxonomyMapping};
