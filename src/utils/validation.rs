//! Centralized validation and helper functions.

/// Smallest number of candidates reported per query
pub const MIN_CANDIDATES: usize = 1;

/// Largest number of candidates reported per query
pub const MAX_CANDIDATES: usize = 10;

/// Clamp a requested candidate count into `[MIN_CANDIDATES, MAX_CANDIDATES]`.
///
/// # Examples
///
/// ```
/// use taxa_consensus::utils::validation::clamp_max_candidates;
///
/// assert_eq!(clamp_max_candidates(0), 1);
/// assert_eq!(clamp_max_candidates(5), 5);
/// assert_eq!(clamp_max_candidates(42), 10);
/// ```
#[must_use]
pub fn clamp_max_candidates(requested: i64) -> usize {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Clamped to 1..=10
    {
        requested.clamp(MIN_CANDIDATES as i64, MAX_CANDIDATES as i64) as usize
    }
}

/// Extract an assembly accession from a genome file name or list entry.
///
/// The accession is the first two `_`-separated parts, so
/// `GCF_000001405.40_GRCh38.p14_genomic.fna` gives `GCF_000001405.40`.
/// Entries without an underscore are returned whole.
///
/// # Examples
///
/// ```
/// use taxa_consensus::utils::validation::accession_from_name;
///
/// assert_eq!(accession_from_name("GCF_000001405.40_GRCh38.p14.fna"), "GCF_000001405.40");
/// assert_eq!(accession_from_name("GCA_123.1"), "GCA_123.1");
/// assert_eq!(accession_from_name("plain"), "plain");
/// ```
#[must_use]
pub fn accession_from_name(name: &str) -> String {
    let mut parts = name.trim().splitn(3, '_');
    match (parts.next(), parts.next()) {
        (Some(prefix), Some(id)) => format!("{prefix}_{id}"),
        (Some(prefix), None) => prefix.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(clamp_max_candidates(i64::MIN), 1);
        assert_eq!(clamp_max_candidates(1), 1);
        assert_eq!(clamp_max_candidates(10), 10);
        assert_eq!(clamp_max_candidates(11), 10);
    }

    #[test]
    fn test_accession_from_name() {
        assert_eq!(
            accession_from_name("GCA_000005845.2_ASM584v2_genomic.fna"),
            "GCA_000005845.2"
        );
        assert_eq!(accession_from_name("  GCF_1.1_X.fna  "), "GCF_1.1");
        assert_eq!(accession_from_name(""), "");
    }
}
