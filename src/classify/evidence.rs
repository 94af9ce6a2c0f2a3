use std::collections::HashMap;

use crate::core::candidate::ClassificationCandidate;
use crate::core::hit::{QueryHit, ReferenceAbundance};
use crate::core::rank::resolve_level;
use crate::parsing::taxonomy::{HierarchyMapping, TaxonomyMapping};

/// Accumulated `coverage × abundance` weight per taxon for one query.
///
/// Owned by a single classification task; never shared for writes.
#[derive(Debug, Clone, Default)]
pub struct TaxonWeights {
    weights: HashMap<String, f64>,
    total: f64,
}

impl TaxonWeights {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add weight to a taxon, starting it at zero if unseen
    pub fn add(&mut self, taxid: &str, weight: f64) {
        if let Some(w) = self.weights.get_mut(taxid) {
            *w += weight;
        } else {
            self.weights.insert(taxid.to_string(), weight);
        }
        self.total += weight;
    }

    /// Sum of all weights added
    #[must_use]
    pub fn total(&self) -> f64 {
        self.total
    }

    /// True when there is no weight to normalize against
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0.0
    }

    #[must_use]
    pub fn weight(&self, taxid: &str) -> Option<f64> {
        self.weights.get(taxid).copied()
    }

    /// `(taxid, weight)` pairs in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(taxid, w)| (taxid.as_str(), *w))
    }

    /// Number of contributing taxa
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Normalized confidence of every contributing taxon; empty when total is zero
    #[must_use]
    pub fn confidences(&self) -> Vec<(&str, f64)> {
        if self.is_empty() {
            return Vec::new();
        }
        self.iter().map(|(taxid, w)| (taxid, w / self.total)).collect()
    }
}

/// What a query's hits say about its identity
#[derive(Debug, Clone)]
pub enum Evidence {
    /// An exact self-hit resolved to a lineage; confidence is 1.0
    Exact(ClassificationCandidate),
    /// Weighted consensus over all hits with a known reference
    Weighted(TaxonWeights),
}

/// Exact-match shortcut.
///
/// Only the first exact hit whose reference has a taxon is considered. If that
/// taxon has no lineage the shortcut yields nothing and weighting takes over.
#[must_use]
pub fn exact_match(
    hits: &[QueryHit],
    taxonomy: &TaxonomyMapping,
    hierarchy: &HierarchyMapping,
) -> Option<ClassificationCandidate> {
    let taxid = hits
        .iter()
        .filter(|hit| hit.is_exact)
        .find_map(|hit| taxonomy.taxid(&hit.reference_id))?;

    let lineage = hierarchy.lineage(taxid)?;
    Some(ClassificationCandidate::new(
        lineage,
        resolve_level(lineage),
        1.0,
    ))
}

/// Weigh each hit with a known reference by `coverage × abundance(reference)`.
///
/// Hits whose reference has no taxon are dropped.
#[must_use]
pub fn weigh_hits(
    hits: &[QueryHit],
    taxonomy: &TaxonomyMapping,
    abundance: &ReferenceAbundance,
) -> TaxonWeights {
    let mut weights = TaxonWeights::new();

    for hit in hits {
        let Some(taxid) = taxonomy.taxid(&hit.reference_id) else {
            continue;
        };
        let weight = hit.coverage * abundance.weight_of(&hit.reference_id);
        weights.add(taxid, weight);
    }

    weights
}

/// Gather evidence for one query: exact shortcut first, weighted consensus otherwise
#[must_use]
pub fn gather_evidence(
    hits: &[QueryHit],
    taxonomy: &TaxonomyMapping,
    hierarchy: &HierarchyMapping,
    abundance: &ReferenceAbundance,
) -> Evidence {
    match exact_match(hits, taxonomy, hierarchy) {
        Some(candidate) => Evidence::Exact(candidate),
        None => Evidence::Weighted(weigh_hits(hits, taxonomy, abundance)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> TaxonomyMapping {
        let mut t = TaxonomyMapping::new();
        t.insert("NC_001", "9606");
        t.insert("NC_002", "9606");
        t.insert("NC_003", "562");
        t.insert("SELF", "10090");
        t
    }

    fn hierarchy() -> HierarchyMapping {
        let mut h = HierarchyMapping::new();
        h.insert("9606", "superkingdom:Eukaryota;species:Homo sapiens");
        h.insert("562", "superkingdom:Bacteria;genus:Escherichia");
        h.insert("10090", "superkingdom:Eukaryota;species:Mus musculus");
        h
    }

    fn hit(query: &str, qlen: u64, reference: &str, alen: u64) -> QueryHit {
        QueryHit::from_alignment(query, qlen, reference, alen)
    }

    #[test]
    fn test_weights_accumulate_per_taxon() {
        let hits = vec![
            hit("Q", 100, "NC_001", 50),
            hit("Q", 100, "NC_002", 100),
            hit("Q", 100, "NC_003", 25),
        ];
        let mut abundance = ReferenceAbundance::new();
        abundance.increment("NC_001");
        abundance.increment("NC_001");
        abundance.increment("NC_002");
        abundance.increment("NC_003");

        let weights = weigh_hits(&hits, &taxonomy(), &abundance);
        // 0.5 * 2 + 1.0 * 1 for 9606, 0.25 * 1 for 562
        assert!((weights.weight("9606").unwrap() - 2.0).abs() < 1e-12);
        assert!((weights.weight("562").unwrap() - 0.25).abs() < 1e-12);
        assert!((weights.total() - 2.25).abs() < 1e-12);
    }

    #[test]
    fn test_confidences_sum_to_one() {
        let hits = vec![
            hit("Q", 300, "NC_001", 100),
            hit("Q", 300, "NC_003", 200),
            hit("Q", 300, "NC_002", 37),
        ];
        let mut abundance = ReferenceAbundance::new();
        for r in ["NC_001", "NC_003", "NC_003", "NC_002"] {
            abundance.increment(r);
        }

        let weights = weigh_hits(&hits, &taxonomy(), &abundance);
        let sum: f64 = weights.confidences().iter().map(|(_, c)| c).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_references_are_dropped() {
        let hits = vec![hit("Q", 100, "UNMAPPED", 100)];
        let weights = weigh_hits(&hits, &taxonomy(), &ReferenceAbundance::new());
        assert!(weights.is_empty());
        assert_eq!(weights.len(), 0);
        assert!(weights.confidences().is_empty());
    }

    #[test]
    fn test_missing_abundance_weighs_as_one() {
        let hits = vec![hit("Q", 100, "NC_003", 40)];
        let weights = weigh_hits(&hits, &taxonomy(), &ReferenceAbundance::new());
        assert!((weights.total() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_exact_match_wins_over_other_hits() {
        let hits = vec![
            hit("SELF", 1000, "NC_001", 1000),
            hit("SELF", 1000, "SELF", 995),
        ];
        let evidence = gather_evidence(&hits, &taxonomy(), &hierarchy(), &ReferenceAbundance::new());
        match evidence {
            Evidence::Exact(c) => {
                assert_eq!(c.lineage, "superkingdom:Eukaryota;species:Mus musculus");
                assert_eq!(c.rank_level, "species");
                assert!((c.confidence - 1.0).abs() < f64::EPSILON);
            }
            Evidence::Weighted(_) => panic!("expected exact evidence"),
        }
    }

    #[test]
    fn test_exact_hit_without_taxon_is_ignored() {
        let hits = vec![hit("ORPHAN", 100, "ORPHAN", 100), hit("ORPHAN", 100, "NC_003", 50)];
        assert!(exact_match(&hits, &taxonomy(), &hierarchy()).is_none());
    }

    #[test]
    fn test_exact_hit_without_lineage_falls_through() {
        let mut tax = taxonomy();
        tax.insert("NOLINEAGE", "777");
        let hits = vec![
            hit("NOLINEAGE", 100, "NOLINEAGE", 100),
            hit("NOLINEAGE", 100, "NC_003", 50),
        ];

        let evidence = gather_evidence(&hits, &tax, &hierarchy(), &ReferenceAbundance::new());
        let Evidence::Weighted(weights) = evidence else {
            panic!("expected weighted evidence");
        };
        assert_eq!(weights.len(), 2);
        assert!((weights.weight("777").unwrap() - 1.0).abs() < 1e-12);
    }
}
