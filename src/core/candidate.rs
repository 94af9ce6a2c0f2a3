use serde::{Deserialize, Serialize};

/// Lineage reported when a query has no usable evidence
pub const UNKNOWN_LINEAGE: &str = "Unknown";

/// Rank level reported for the unknown lineage and for unrecognized lineages
pub const ROOT_LEVEL: &str = "root";

/// One proposed taxonomic assignment for a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationCandidate {
    /// Semicolon-separated `rank:name` tokens
    pub lineage: String,

    /// Deepest recognized rank in the lineage, or "root"
    pub rank_level: String,

    /// Share of the query's evidence, in `[0, 1]`
    pub confidence: f64,
}

impl ClassificationCandidate {
    pub fn new(lineage: impl Into<String>, rank_level: impl Into<String>, confidence: f64) -> Self {
        Self {
            lineage: lineage.into(),
            rank_level: rank_level.into(),
            confidence,
        }
    }

    /// The `("Unknown", "root", 0.0)` sentinel
    #[must_use]
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_LINEAGE, ROOT_LEVEL, 0.0)
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.lineage == UNKNOWN_LINEAGE
    }
}

/// Ranked candidates for a single query, best first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub query_id: String,
    pub candidates: Vec<ClassificationCandidate>,
}

impl ClassificationResult {
    pub fn new(query_id: impl Into<String>, candidates: Vec<ClassificationCandidate>) -> Self {
        Self {
            query_id: query_id.into(),
            candidates,
        }
    }

    /// Result carrying only the unknown sentinel
    pub fn unknown(query_id: impl Into<String>) -> Self {
        Self::new(query_id, vec![ClassificationCandidate::unknown()])
    }

    /// Highest-confidence candidate
    #[must_use]
    pub fn top(&self) -> Option<&ClassificationCandidate> {
        self.candidates.first()
    }

    /// A query counts as classified when its top lineage is not "Unknown"
    #[must_use]
    pub fn is_classified(&self) -> bool {
        self.top().is_some_and(|c| !c.is_unknown())
    }
}
