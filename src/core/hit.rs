use std::collections::HashMap;

/// Minimum coverage for a self-hit to count as an exact match
pub const EXACT_MATCH_MIN_COVERAGE: f64 = 0.99;

/// A single alignment of a query against a reference sequence
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHit {
    /// Reference sequence identifier (target name)
    pub reference_id: String,

    /// Fraction of the query spanned by the aligned block, in `[0, 1]` for sane input
    pub coverage: f64,

    /// Query and reference share an identifier and coverage is at least 0.99
    pub is_exact: bool,
}

impl QueryHit {
    /// Build a hit from raw alignment fields.
    ///
    /// Coverage is `aligned_length / query_length`, or 0 when the query length is 0.
    #[must_use]
    pub fn from_alignment(
        query_id: &str,
        query_length: u64,
        reference_id: impl Into<String>,
        aligned_length: u64,
    ) -> Self {
        let reference_id = reference_id.into();
        let coverage = if query_length > 0 {
            to_f64(aligned_length) / to_f64(query_length)
        } else {
            0.0
        };
        let is_exact = query_id == reference_id && coverage >= EXACT_MATCH_MIN_COVERAGE;

        Self {
            reference_id,
            coverage,
            is_exact,
        }
    }
}

#[inline]
#[allow(clippy::cast_precision_loss)]
fn to_f64(n: u64) -> f64 {
    n as f64
}

/// Hits grouped by query, in the order queries were first seen.
///
/// Each query's hit list keeps file-encounter order, which the exact-match
/// shortcut relies on for its first-match rule.
#[derive(Debug, Default)]
pub struct QueryHitSet {
    entries: Vec<(String, Vec<QueryHit>)>,
    index: HashMap<String, usize>,
}

impl QueryHitSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hit to the query's list, registering the query on first sight
    pub fn push(&mut self, query_id: &str, hit: QueryHit) {
        if let Some(&idx) = self.index.get(query_id) {
            self.entries[idx].1.push(hit);
        } else {
            self.index.insert(query_id.to_string(), self.entries.len());
            self.entries.push((query_id.to_string(), vec![hit]));
        }
    }

    /// Hits recorded for a query, if any
    #[must_use]
    pub fn get(&self, query_id: &str) -> Option<&[QueryHit]> {
        self.index
            .get(query_id)
            .map(|&idx| self.entries[idx].1.as_slice())
    }

    /// Number of distinct queries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate queries in first-appearance order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[QueryHit])> {
        self.entries
            .iter()
            .map(|(query, hits)| (query.as_str(), hits.as_slice()))
    }

    /// Consume the set, yielding owned `(query, hits)` pairs in first-appearance order
    #[must_use]
    pub fn into_entries(self) -> Vec<(String, Vec<QueryHit>)> {
        self.entries
    }
}

/// Corpus-wide count of alignment records citing each reference
#[derive(Debug, Clone, Default)]
pub struct ReferenceAbundance {
    counts: HashMap<String, u64>,
}

impl ReferenceAbundance {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more alignment record against `reference_id`
    pub fn increment(&mut self, reference_id: &str) {
        if let Some(count) = self.counts.get_mut(reference_id) {
            *count += 1;
        } else {
            self.counts.insert(reference_id.to_string(), 1);
        }
    }

    /// Recorded count for a reference, if it was ever seen
    #[must_use]
    pub fn get(&self, reference_id: &str) -> Option<u64> {
        self.counts.get(reference_id).copied()
    }

    /// Count used for weighting; references never seen weigh as 1
    #[must_use]
    pub fn weight_of(&self, reference_id: &str) -> f64 {
        to_f64(self.get(reference_id).unwrap_or(1))
    }

    /// Number of distinct references seen
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_and_exact_flag() {
        let hit = QueryHit::from_alignment("Q1", 1000, "NC_001", 990);
        assert!((hit.coverage - 0.99).abs() < 1e-12);
        assert!(!hit.is_exact);

        let hit = QueryHit::from_alignment("NC_001", 1000, "NC_001", 990);
        assert!(hit.is_exact);

        let hit = QueryHit::from_alignment("NC_001", 1000, "NC_001", 989);
        assert!(!hit.is_exact);
    }

    #[test]
    fn test_zero_length_query_has_zero_coverage() {
        let hit = QueryHit::from_alignment("Q1", 0, "Q1", 500);
        assert!(hit.coverage.abs() < f64::EPSILON);
        assert!(!hit.is_exact);
    }

    #[test]
    fn test_hit_set_preserves_first_appearance_order() {
        let mut set = QueryHitSet::new();
        set.push("B", QueryHit::from_alignment("B", 10, "r1", 5));
        set.push("A", QueryHit::from_alignment("A", 10, "r2", 5));
        set.push("B", QueryHit::from_alignment("B", 10, "r3", 5));

        let order: Vec<&str> = set.iter().map(|(q, _)| q).collect();
        assert_eq!(order, vec!["B", "A"]);

        let hits = set.get("B").unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].reference_id, "r1");
        assert_eq!(hits[1].reference_id, "r3");
        assert!(set.get("C").is_none());
    }

    #[test]
    fn test_abundance_defaults_to_one() {
        let mut abundance = ReferenceAbundance::new();
        abundance.increment("r1");
        abundance.increment("r1");

        assert_eq!(abundance.get("r1"), Some(2));
        assert!((abundance.weight_of("r1") - 2.0).abs() < f64::EPSILON);
        assert!((abundance.weight_of("missing") - 1.0).abs() < f64::EPSILON);
    }
}
