use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    catalog::Catalog,
    config::{AnchorExclusion, ContentConfig},
    ranker::{HitEntry, Hits},
    utils::sort::argsort_desc,
    vectorizer::{
        similarity::{tag_fingerprint, SimilarityCache, SimilarityMatrix},
        tokenizer::Tokenizer,
        TfIdfVectorizer,
    },
};

/// Recommends items whose tags look like the tags of an anchor item.
///
/// The anchor is the first catalog item whose name contains the query
/// (case-insensitive). Every item's tags are TF-IDF weighted, all pairs are
/// cosine-compared, and items are returned by similarity to the anchor.
///
/// With `AnchorExclusion::Positional` the first ranked slot is skipped
/// rather than the anchor itself. When another item ties the anchor at the
/// top (identical tags) and sits earlier in the catalog, that item is the
/// one skipped and the anchor shows up in the results.
/// An anchor without tags has an all-zero row and is dropped by position.
#[derive(Debug, Clone, Default)]
pub struct ContentSimilarityRanker {
    config: ContentConfig,
    cache: Option<Arc<SimilarityCache>>,
}

impl ContentSimilarityRanker {
    pub fn new(config: ContentConfig) -> Self {
        let cache = config.cache.then(|| Arc::new(SimilarityCache::new()));
        Self { config, cache }
    }

    /// Share an existing cache (e.g. between request handlers)
    pub fn with_cache(mut self, cache: Arc<SimilarityCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&Arc<SimilarityCache>> {
        self.cache.as_ref()
    }

    #[inline]
    pub fn config(&self) -> &ContentConfig {
        &self.config
    }

    /// Position of the anchor item for `query_text`, if any
    pub fn resolve_anchor(&self, catalog: &Catalog, query_text: &str) -> Option<usize> {
        catalog.find_name_containing(query_text)
    }

    /// Pairwise tag similarity of the whole catalog.
    /// Row `i` is catalog row `i`; items without tags get all-zero rows.
    pub fn similarity_matrix(&self, catalog: &Catalog) -> Arc<SimilarityMatrix> {
        let build = || {
            let mut vectorizer: TfIdfVectorizer<f64> =
                TfIdfVectorizer::new(Tokenizer::from_config(&self.config));
            let vectors = vectorizer.fit_transform(catalog.iter().map(|item| item.tags()));
            SimilarityMatrix::from_vectors(&vectors)
        };
        match &self.cache {
            Some(cache) => {
                let fingerprint = tag_fingerprint(catalog, &self.config);
                cache.get_or_build(fingerprint, catalog.len(), build)
            }
            None => Arc::new(build()),
        }
    }

    /// Up to `top_n` items similar to the item named by `query_text`.
    /// Blank or unmatched queries give empty hits.
    pub fn recommend(&self, catalog: &Catalog, query_text: &str, top_n: usize) -> Hits {
        if query_text.trim().is_empty() {
            debug!("empty content query");
            return Hits::empty();
        }
        let Some(anchor) = self.resolve_anchor(catalog, query_text) else {
            debug!(query = query_text, "no item name matches query");
            return Hits::empty();
        };
        debug!(query = query_text, anchor, "resolved anchor item");
        self.recommend_for_anchor(catalog, anchor, top_n)
    }

    /// Up to `top_n` items similar to catalog row `anchor`
    pub fn recommend_for_anchor(&self, catalog: &Catalog, anchor: usize, top_n: usize) -> Hits {
        let matrix = self.similarity_matrix(catalog);
        let Some(row) = matrix.row(anchor) else {
            warn!(anchor, size = matrix.size(), "anchor outside similarity matrix");
            return Hits::empty();
        };
        let order = argsort_desc(row);
        // zero self-similarity: the anchor is not in the first slot
        let by_identity = match self.config.exclusion {
            AnchorExclusion::Positional => row[anchor] == 0.0,
            AnchorExclusion::Identity => true,
        };
        let ranked: Box<dyn Iterator<Item = usize>> = if by_identity {
            Box::new(order.into_iter().filter(move |&i| i != anchor))
        } else {
            Box::new(order.into_iter().skip(1))
        };
        Hits::new(
            ranked
                .take(top_n)
                .map(|index| HitEntry { index, score: row[index] })
                .collect(),
        )
    }
}
