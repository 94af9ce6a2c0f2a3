use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::classify::evidence::{gather_evidence, Evidence};
use crate::classify::ranker::rank_lineages;
use crate::classify::report::{write_report, ClassificationSummary};
use crate::classify::ClassifyError;
use crate::core::candidate::ClassificationResult;
use crate::core::hit::{QueryHit, QueryHitSet, ReferenceAbundance};
use crate::parsing::alignment::parse_alignment_file;
use crate::parsing::taxonomy::{load_hierarchy, load_taxonomy, HierarchyMapping, TaxonomyMapping};
use crate::utils::validation::clamp_max_candidates;

/// Default size of the classification worker pool
pub const DEFAULT_WORKERS: usize = 4;

/// Default number of candidates reported per query
pub const DEFAULT_MAX_CANDIDATES: usize = 5;

/// Configuration for the classification engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyConfig {
    /// Worker threads used for per-query classification
    pub workers: usize,
    /// Maximum candidates per query; the engine clamps it into `[1, 10]`
    pub max_candidates: usize,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

impl ClassifyConfig {
    /// Build a config, clamping `max_candidates` into `[1, 10]` and `workers` to at least 1
    #[must_use]
    pub fn new(workers: usize, max_candidates: i64) -> Self {
        let clamped = clamp_max_candidates(max_candidates);
        if i64::try_from(clamped).ok() != Some(max_candidates) {
            warn!("max-candidates {max_candidates} is outside 1-10. Using {clamped}.");
        }

        Self {
            workers: workers.max(1),
            max_candidates: clamped,
        }
    }

    /// Clamp a config that was built or deserialized without going through `new`
    #[must_use]
    pub fn normalized(self) -> Self {
        let requested = i64::try_from(self.max_candidates).unwrap_or(i64::MAX);
        Self::new(self.workers, requested)
    }
}

/// Paths to the three inputs of a classification run
#[derive(Debug, Clone)]
pub struct ClassifyInputs {
    pub alignments: PathBuf,
    pub taxonomy: PathBuf,
    pub hierarchy: PathBuf,
}

/// Per-query classifier over read-only lookups shared by every worker
pub struct ClassificationEngine<'a> {
    taxonomy: &'a TaxonomyMapping,
    hierarchy: &'a HierarchyMapping,
    abundance: &'a ReferenceAbundance,
    config: ClassifyConfig,
}

impl<'a> ClassificationEngine<'a> {
    pub fn new(
        taxonomy: &'a TaxonomyMapping,
        hierarchy: &'a HierarchyMapping,
        abundance: &'a ReferenceAbundance,
        config: ClassifyConfig,
    ) -> Self {
        Self {
            taxonomy,
            hierarchy,
            abundance,
            config: config.normalized(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClassifyConfig {
        &self.config
    }

    /// Classify a single query from its hits
    #[must_use]
    pub fn classify_query(&self, query_id: &str, hits: &[QueryHit]) -> ClassificationResult {
        let candidates = match gather_evidence(hits, self.taxonomy, self.hierarchy, self.abundance) {
            Evidence::Exact(candidate) => vec![candidate],
            Evidence::Weighted(weights) => {
                rank_lineages(&weights, self.hierarchy, self.config.max_candidates)
            }
        };

        ClassificationResult::new(query_id, candidates)
    }

    /// Classify every query on a pool of `config.workers` threads.
    ///
    /// Results come back in the hit set's query order regardless of which
    /// worker finishes first.
    ///
    /// # Errors
    ///
    /// Returns `ClassifyError::ThreadPool` if the worker pool cannot be created.
    pub fn classify_all(&self, hits: QueryHitSet) -> Result<Vec<ClassificationResult>, ClassifyError> {
        self.classify_all_with(hits, |query_id, query_hits| {
            self.classify_query(query_id, query_hits)
        })
    }

    /// Run `classify` for every query on the worker pool. A query whose call
    /// panics is reported as unknown; the other queries are unaffected.
    pub(crate) fn classify_all_with<F>(
        &self,
        hits: QueryHitSet,
        classify: F,
    ) -> Result<Vec<ClassificationResult>, ClassifyError>
    where
        F: Fn(&str, &[QueryHit]) -> ClassificationResult + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()?;

        let results: Vec<ClassificationResult> = pool.install(|| {
            hits.into_entries()
                .into_par_iter()
                .map(|(query_id, query_hits)| classify_isolated(query_id, &query_hits, &classify))
                .collect()
        });

        Ok(results)
    }
}

fn classify_isolated<F>(query_id: String, hits: &[QueryHit], classify: &F) -> ClassificationResult
where
    F: Fn(&str, &[QueryHit]) -> ClassificationResult,
{
    match catch_unwind(AssertUnwindSafe(|| classify(&query_id, hits))) {
        Ok(result) => result,
        Err(_) => {
            error!("Classification of {query_id} failed; reporting it as Unknown");
            ClassificationResult::unknown(query_id)
        }
    }
}

/// Run a full classification: load inputs, classify every query, write the report.
///
/// All inputs are loaded before any query is classified, since weighting
/// depends on abundance across the whole alignment file.
///
/// # Errors
///
/// Returns `ClassifyError::Load` if any input is unreadable or lacks a required
/// column, `ClassifyError::ThreadPool` if the pool cannot be built, or
/// `ClassifyError::Report` if the report cannot be written. Nothing is written
/// on a load failure.
pub fn classify_files(
    inputs: &ClassifyInputs,
    output: &Path,
    config: ClassifyConfig,
) -> Result<ClassificationSummary, ClassifyError> {
    let taxonomy = load_taxonomy(&inputs.taxonomy).map_err(|source| ClassifyError::Load {
        input: "taxonomy",
        path: inputs.taxonomy.clone(),
        source,
    })?;
    let hierarchy = load_hierarchy(&inputs.hierarchy).map_err(|source| ClassifyError::Load {
        input: "hierarchy",
        path: inputs.hierarchy.clone(),
        source,
    })?;
    let alignments =
        parse_alignment_file(&inputs.alignments).map_err(|source| ClassifyError::Load {
            input: "alignments",
            path: inputs.alignments.clone(),
            source,
        })?;

    let engine = ClassificationEngine::new(&taxonomy, &hierarchy, &alignments.abundance, config);
    let max_candidates = engine.config().max_candidates;
    let results = engine.classify_all(alignments.hits)?;

    write_report(output, &results, max_candidates)?;
    let summary = ClassificationSummary::from_results(&results, max_candidates, output);

    info!("Classification complete. Results saved to {}", output.display());
    info!(
        "Classified: {}/{} ({:.1}%)",
        summary.classified,
        summary.total,
        summary.rate * 100.0
    );
    info!("Maximum candidates shown per query: {max_candidates}");

    Ok(summary)
}
