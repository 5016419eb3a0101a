/// This crate is a catalog recommendation engine built on a TF-IDF vectorizer
/// and a sparse rating matrix.
pub mod catalog;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod ranker;
pub mod utils;
pub mod vectorizer;

/// Catalog
/// Immutable, position-indexed table of items shared by every ranker.
/// Position `i` in the catalog is row `i` of every vector and matrix built from it.
///
/// Filtering (`filter`, `with_main_category`) builds a new `Catalog`;
/// rankers only see the subset they are handed.
///
/// # Serialization
/// CBOR snapshots via `from_cbor` / `to_cbor`.
pub use catalog::{Catalog, Item};

/// Interaction Log
/// Read-only (user, item, rating) history consumed by `CollaborativeRanker`.
/// User id `0` is reserved for "unknown user".
pub use catalog::{Interaction, InteractionLog};

/// Recommender Facade
/// Holds one catalog / interaction snapshot and exposes each ranker as one call:
/// - `top_rated`: popularity
/// - `similar_to`: tag content similarity
/// - `for_user`: collaborative filtering
/// - `evaluate`: offline precision / recall / F1
///
/// Ranker outputs are never combined.
pub use ranker::recommender::Recommender;

/// Rankers
/// Each ranker is a pure function of its inputs and returns `Hits`
/// (catalog positions with scores, best first).
pub use ranker::{
    collaborative::CollaborativeRanker, content::ContentSimilarityRanker, popularity::PopularityRanker,
};

/// Ranked Hits and Display Record
/// - `Hits`: ranked list of `HitEntry`
/// - `HitEntry`: catalog position and score
/// - `DisplayRecord`: the fields shown for one recommendation
pub use ranker::{DisplayRecord, HitEntry, Hits};

/// Evaluation Harness
/// Scores a ranked list against a same-category relevance set.
/// Returns `Evaluation::NotFound` when the query item is absent.
pub use evaluate::{metrics::Metrics, Evaluation, EvaluationHarness};

/// TF-IDF Vectorizer
/// Tokenizes tag strings, builds the corpus document frequencies and emits
/// one L2-normalized sparse TF-IDF vector per document.
pub use vectorizer::TfIdfVectorizer;

pub use config::RecommenderConfig;
pub use error::{Error, Result};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    /// 5 items; A and B share category "Beauty", the rest differ
    fn catalog() -> Catalog {
        Catalog::new(vec![
            Item::new(1, "Charger Cable").with_tags("usb charger cable").with_category("Electronics").with_rating(4.1, 30),
            Item::new(2, "Face Cream Deluxe").with_tags("face cream moisturizer").with_category("Beauty").with_rating(4.6, 12),
            Item::new(3, "Trail Runner").with_tags("running shoes trail").with_category("Sports").with_rating(4.6, 80),
            Item::new(4, "Face Cream Lite").with_tags("face cream lotion").with_category("Beauty").with_rating(3.9, 5),
            Item::new(5, "Desk Lamp").with_tags("led desk lamp").with_category("Home"),
        ])
    }

    fn interactions() -> InteractionLog {
        vec![
            Interaction::new(7, 1, 5.0),
            Interaction::new(7, 3, 4.0),
            Interaction::new(8, 1, 4.0),
            Interaction::new(8, 2, 5.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn face_cream_resolves_first_and_ranks_twin_first() {
        let cat = catalog();
        let ranker = ContentSimilarityRanker::default();
        assert_eq!(ranker.resolve_anchor(&cat, "face cream"), Some(1));
        let hits = ranker.recommend(&cat, "face cream", 3);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits.list[0].index, 3);
        assert!(hits.list[0].score > 0.0);
        assert!(!hits.indices().contains(&1));
        assert!(hits.list[1..].iter().all(|e| e.score < hits.list[0].score));
    }

    #[test]
    fn nonexistent_item_is_not_found() {
        let result = EvaluationHarness::default().evaluate(&catalog(), "NonexistentItem", 5);
        assert_eq!(result, Evaluation::NotFound);
    }

    #[test]
    fn user_without_history_gets_popularity() {
        let cat = catalog();
        let ranker = CollaborativeRanker::new(Default::default(), Arc::new(interactions()));
        assert_eq!(ranker.recommend(&cat, 42, 5), PopularityRanker.rank(&cat, 5));
        assert_eq!(ranker.recommend(&cat, 0, 5), PopularityRanker.rank(&cat, 5));
    }

    #[test]
    fn popularity_is_stable_on_ties() {
        // items 2 and 3 tie on rating; 3 has more reviews
        assert_eq!(PopularityRanker.rank(&catalog(), 5).indices(), vec![2, 1, 0, 3, 4]);
    }

    #[test]
    fn facade_end_to_end() {
        let rec = Recommender::new(
            Arc::new(catalog()),
            Arc::new(interactions()),
            RecommenderConfig::default(),
        )
        .unwrap();
        let metrics = rec.evaluate("Face Cream Deluxe", Some(3)).metrics().copied().unwrap();
        // twin retrieved, relevance set is the twin only
        assert_eq!(metrics.true_positives, 1);
        assert_eq!(metrics.recall, 1.0);
        assert!((metrics.precision - 1.0 / 3.0).abs() < 1e-12);
        assert!((metrics.f1 - 0.5).abs() < 1e-12);

        // user 7 shares item 1 with user 8, who also rated item 2
        assert_eq!(rec.for_user(7, None).indices(), vec![1]);
        let records = rec.top_rated(Some(1)).records(rec.catalog());
        assert_eq!(records[0].name, "Trail Runner");
    }
}
