pub mod metrics;

use std::collections::HashSet;

use ahash::RandomState;
use tracing::{debug, info};

use crate::{
    catalog::Catalog,
    config::{EvaluationConfig, RelevancePolicy},
    evaluate::metrics::Metrics,
    ranker::{content::ContentSimilarityRanker, Hits},
};

/// Outcome of one offline evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// the query item does not exist in the catalog
    NotFound,
    /// the query resolved; metrics may still be all zero
    Scored(Metrics),
}

impl Evaluation {
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Evaluation::NotFound)
    }

    #[inline]
    pub fn metrics(&self) -> Option<&Metrics> {
        match self {
            Evaluation::Scored(m) => Some(m),
            Evaluation::NotFound => None,
        }
    }
}

/// Post-hoc scorer for ranked lists.
///
/// Ground truth is a proxy: items related to the query item under the
/// configured `RelevancePolicy`, excluding the query item itself.
#[derive(Debug, Clone, Default)]
pub struct EvaluationHarness {
    config: EvaluationConfig,
    ranker: ContentSimilarityRanker,
}

impl EvaluationHarness {
    pub fn new(config: EvaluationConfig, ranker: ContentSimilarityRanker) -> Self {
        Self { config, ranker }
    }

    /// Score the content ranker for the item named exactly `query_item`.
    ///
    /// The ranker receives the same text and resolves its own anchor, so
    /// the anchor is the first catalog name *containing* the text.
    pub fn evaluate(&self, catalog: &Catalog, query_item: &str, top_n: usize) -> Evaluation {
        self.evaluate_with(catalog, query_item, top_n, |catalog| {
            self.ranker.recommend(catalog, query_item, top_n)
        })
    }

    /// Score any ranker's output for the item named exactly `query_item`
    pub fn evaluate_with<F>(&self, catalog: &Catalog, query_item: &str, top_n: usize, rank: F) -> Evaluation
    where
        F: FnOnce(&Catalog) -> Hits,
    {
        let Some(query_pos) = catalog.find_exact_name(query_item) else {
            info!(query = query_item, "evaluation item not found");
            return Evaluation::NotFound;
        };
        let hits = rank(catalog);
        let metrics = self.score_hits(catalog, query_pos, &hits, top_n);
        debug!(
            query = query_item,
            precision = metrics.precision,
            recall = metrics.recall,
            f1 = metrics.f1,
            "evaluated ranking"
        );
        Evaluation::Scored(metrics)
    }

    /// Catalog positions relevant to the item at `query_pos`, ascending
    pub fn relevance_set(&self, catalog: &Catalog, query_pos: usize) -> Vec<usize> {
        let Some(query) = catalog.get(query_pos) else {
            return Vec::new();
        };
        let category = query.category.as_deref();
        let brand = query.brand.as_deref().filter(|b| !b.is_empty());
        catalog
            .iter()
            .enumerate()
            .filter(|(pos, _)| *pos != query_pos)
            .filter(|(_, item)| {
                let same_category = category.is_some() && item.category.as_deref() == category;
                match self.config.relevance {
                    RelevancePolicy::SameCategory => same_category,
                    RelevancePolicy::SameCategoryOrBrand => {
                        same_category || (brand.is_some() && item.brand.as_deref() == brand)
                    }
                }
            })
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Precision over `top_n`, recall over the relevance set
    pub fn score_hits(&self, catalog: &Catalog, query_pos: usize, hits: &Hits, top_n: usize) -> Metrics {
        let relevant: HashSet<usize, RandomState> =
            self.relevance_set(catalog, query_pos).into_iter().collect();
        let retrieved: HashSet<usize, RandomState> = hits.list.iter().map(|e| e.index).collect();
        let true_positives = retrieved.intersection(&relevant).count();
        Metrics::from_counts(true_positives, top_n, relevant.len())
    }
}
