use std::cmp::Ordering;

use crate::classify::evidence::TaxonWeights;
use crate::core::candidate::ClassificationCandidate;
use crate::core::rank::resolve_level;
use crate::parsing::taxonomy::HierarchyMapping;

/// Turn taxon weights into at most `max_candidates` ranked lineages.
///
/// Candidates are ordered by descending confidence, ties broken by ascending
/// taxon id. Taxa without a lineage are dropped. When nothing survives, or there
/// is no weight at all, the result is the single unknown sentinel.
#[must_use]
pub fn rank_lineages(
    weights: &TaxonWeights,
    hierarchy: &HierarchyMapping,
    max_candidates: usize,
) -> Vec<ClassificationCandidate> {
    if weights.is_empty() {
        return vec![ClassificationCandidate::unknown()];
    }

    let mut scored: Vec<(&str, ClassificationCandidate)> = weights
        .confidences()
        .into_iter()
        .filter_map(|(taxid, confidence)| {
            let lineage = hierarchy.lineage(taxid)?;
            Some((
                taxid,
                ClassificationCandidate::new(lineage, resolve_level(lineage), confidence),
            ))
        })
        .collect();

    if scored.is_empty() {
        return vec![ClassificationCandidate::unknown()];
    }

    scored.sort_by(|(a_taxid, a), (b_taxid, b)| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a_taxid.cmp(b_taxid))
    });

    scored
        .into_iter()
        .take(max_candidates)
        .map(|(_, candidate)| candidate)
        .collect()
}
