//! Core data types for alignment-based taxonomic classification.
//!
//! - [`QueryHit`]: One alignment of a query against a reference, with coverage and exact flag
//! - [`QueryHitSet`]: Hits grouped per query in encounter order
//! - [`ReferenceAbundance`]: How many alignment records cite each reference
//! - [`ClassificationCandidate`], [`ClassificationResult`]: Ranked assignments per query
//! - [`Rank`]: The fixed rank scale used to name a lineage's depth
//!
//! ## Lineages
//!
//! A lineage is a `;`-separated list of `rank:name` tokens:
//!
//! ```text
//! superkingdom:Eukaryota;phylum:Chordata;species:Homo sapiens
//! ```
//!
//! Only the ranks superkingdom, phylum, class, order, family, genus, species and
//! strain are recognized when resolving depth.
//!
//! [`QueryHit`]: hit::QueryHit
//! [`QueryHitSet`]: hit::QueryHitSet
//! [`ReferenceAbundance`]: hit::ReferenceAbundance
//! [`ClassificationCandidate`]: candidate::ClassificationCandidate
//! [`ClassificationResult`]: candidate::ClassificationResult
//! [`Rank`]: rank::Rank

pub mod candidate;
pub mod hit;
pub mod rank;
