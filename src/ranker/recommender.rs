use std::sync::Arc;

use tracing::debug;

use crate::{
    catalog::{Catalog, InteractionLog},
    config::RecommenderConfig,
    error::Result,
    evaluate::{EvaluationHarness, Evaluation},
    ranker::{
        collaborative::CollaborativeRanker, content::ContentSimilarityRanker,
        popularity::PopularityRanker, Hits,
    },
};

/// One catalog + interaction snapshot with every ranker wired to it.
///
/// Each method runs exactly one ranker; outputs are never blended.
/// `top_n = None` uses `RecommenderConfig::default_top_n`.
#[derive(Debug, Clone)]
pub struct Recommender {
    catalog: Arc<Catalog>,
    interactions: Arc<InteractionLog>,
    config: RecommenderConfig,
    popularity: PopularityRanker,
    content: ContentSimilarityRanker,
    collaborative: CollaborativeRanker,
    harness: EvaluationHarness,
}

impl Recommender {
    pub fn new(catalog: Arc<Catalog>, interactions: Arc<InteractionLog>, config: RecommenderConfig) -> Result<Self> {
        config.validate()?;
        let content = ContentSimilarityRanker::new(config.content.clone());
        let collaborative = CollaborativeRanker::new(config.collaborative.clone(), Arc::clone(&interactions));
        let harness = EvaluationHarness::new(config.evaluation.clone(), content.clone());
        debug!(
            items = catalog.len(),
            interactions = interactions.len(),
            "recommender ready"
        );
        Ok(Self {
            catalog,
            interactions,
            config,
            popularity: PopularityRanker,
            content,
            collaborative,
            harness,
        })
    }

    #[inline]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    #[inline]
    pub fn interactions(&self) -> &Arc<InteractionLog> {
        &self.interactions
    }

    #[inline]
    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Same rankers, narrowed to one main category (`"All"` keeps everything)
    pub fn for_main_category(&self, name: &str) -> Self {
        Self {
            catalog: Arc::new(self.catalog.with_main_category(name)),
            ..self.clone()
        }
    }

    #[inline]
    fn n(&self, top_n: Option<usize>) -> usize {
        top_n.unwrap_or(self.config.default_top_n)
    }

    pub fn top_rated(&self, top_n: Option<usize>) -> Hits {
        self.popularity.rank(&self.catalog, self.n(top_n))
    }

    pub fn similar_to(&self, query: &str, top_n: Option<usize>) -> Hits {
        self.content.recommend(&self.catalog, query, self.n(top_n))
    }

    pub fn for_user(&self, user_id: u64, top_n: Option<usize>) -> Hits {
        self.collaborative.recommend(&self.catalog, user_id, self.n(top_n))
    }

    pub fn evaluate(&self, item_name: &str, top_n: Option<usize>) -> Evaluation {
        self.harness.evaluate(&self.catalog, item_name, self.n(top_n))
    }
}
