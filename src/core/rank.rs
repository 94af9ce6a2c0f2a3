//! Taxonomic rank scale and lineage depth resolution.

use std::fmt;
use std::str::FromStr;

use crate::core::candidate::ROOT_LEVEL;

/// Recognized ranks, ordered from shallowest to deepest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Superkingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
    Strain,
}

impl Rank {
    pub const ALL: [Rank; 8] = [
        Rank::Superkingdom,
        Rank::Phylum,
        Rank::Class,
        Rank::Order,
        Rank::Family,
        Rank::Genus,
        Rank::Species,
        Rank::Strain,
    ];

    /// Position on the ordinal scale (superkingdom = 0 … strain = 7)
    #[must_use]
    pub fn ordinal(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Rank::Superkingdom => "superkingdom",
            Rank::Phylum => "phylum",
            Rank::Class => "class",
            Rank::Order => "order",
            Rank::Family => "family",
            Rank::Genus => "genus",
            Rank::Species => "species",
            Rank::Strain => "strain",
        }
    }

    /// Case-insensitive lookup; surrounding whitespace is ignored
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|rank| rank.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unrecognized rank: {s}"))
    }
}

/// Deepest recognized rank appearing anywhere in a lineage.
///
/// Tokens are `rank:name` pairs separated by `;`. Token order does not matter:
/// `"species:X;superkingdom:Y"` resolves to species. Tokens without a `:` or with
/// an unrecognized rank are ignored.
#[must_use]
pub fn deepest_rank(lineage: &str) -> Option<Rank> {
    lineage
        .split(';')
        .filter_map(|token| token.trim().split_once(':'))
        .filter_map(|(rank, _name)| Rank::parse(rank))
        .max()
}

/// Rank level name for a lineage, or "root" when no recognized rank appears
#[must_use]
pub fn resolve_level(lineage: &str) -> &'static str {
    deepest_rank(lineage).map_or(ROOT_LEVEL, Rank::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals() {
        assert_eq!(Rank::Superkingdom.ordinal(), 0);
        assert_eq!(Rank::Species.ordinal(), 6);
        assert_eq!(Rank::Strain.ordinal(), 7);
        assert!(Rank::Genus < Rank::Species);
    }

    #[test]
    fn test_resolve_level_canonical_order() {
        assert_eq!(
            resolve_level("superkingdom:Eukaryota;species:Homo sapiens"),
            "species"
        );
    }

    #[test]
    fn test_resolve_level_is_order_independent() {
        assert_eq!(resolve_level("species:X;superkingdom:Y"), "species");
        assert_eq!(resolve_level("genus:A;phylum:B;family:C"), "genus");
    }

    #[test]
    fn test_resolve_level_case_insensitive() {
        assert_eq!(resolve_level("SuperKingdom:Bacteria; PHYLUM:Proteobacteria"), "phylum");
    }

    #[test]
    fn test_resolve_level_root_fallback() {
        assert_eq!(resolve_level(""), "root");
        assert_eq!(resolve_level("Unknown"), "root");
        assert_eq!(resolve_level("clade:Opisthokonta;no rank:cellular organisms"), "root");
    }

    #[test]
    fn test_name_may_contain_colon() {
        assert_eq!(resolve_level("strain:K-12:MG1655;genus:Escherichia"), "strain");
    }

    #[test]
    fn test_rank_from_str() {
        assert_eq!("Order".parse::<Rank>().unwrap(), Rank::Order);
        assert!("kingdom".parse::<Rank>().is_err());
    }
}
