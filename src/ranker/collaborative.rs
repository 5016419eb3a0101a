use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    catalog::{Catalog, InteractionLog, UNKNOWN_USER},
    config::{CollaborativeConfig, CollaborativeMode},
    ranker::{
        popularity::PopularityRanker,
        ratings::{RatingMatrix, RatingRow},
        HitEntry, Hits,
    },
    utils::sort::{cmp_desc, sort_desc_by2},
};

/// Ranks unrated items for a user from the ratings of similar users
/// (or of similar items).
///
/// Cold start (user 0, or no ratings on any item of the given catalog)
/// returns exactly what `PopularityRanker` returns.
#[derive(Debug, Clone)]
pub struct CollaborativeRanker {
    config: CollaborativeConfig,
    interactions: Arc<InteractionLog>,
}

impl CollaborativeRanker {
    pub fn new(config: CollaborativeConfig, interactions: Arc<InteractionLog>) -> Self {
        Self { config, interactions }
    }

    #[inline]
    pub fn config(&self) -> &CollaborativeConfig {
        &self.config
    }

    pub fn recommend(&self, catalog: &Catalog, user_id: u64, top_n: usize) -> Hits {
        if user_id == UNKNOWN_USER {
            info!(user_id, reason = "unknown user", "falling back to popularity");
            return PopularityRanker.rank(catalog, top_n);
        }
        let matrix = RatingMatrix::build(catalog, &self.interactions);
        let Some(target) = matrix.user_row(user_id).filter(|row| !row.is_empty()) else {
            info!(user_id, reason = "no ratings in catalog", "falling back to popularity");
            return PopularityRanker.rank(catalog, top_n);
        };

        let predictions = match self.config.mode {
            CollaborativeMode::UserBased => self.predict_user_based(&matrix, user_id, target),
            CollaborativeMode::ItemBased => self.predict_item_based(&matrix, target),
        };
        debug!(
            user_id,
            mode = ?self.config.mode,
            candidates = predictions.len(),
            "collaborative predictions"
        );

        // predictions arrive in catalog order, so the stable sort leaves
        // catalog order as the last tie-break
        let mut ranked: Vec<(usize, f64, u64)> = predictions
            .into_iter()
            .map(|(pos, score)| {
                let reviews = catalog.get(pos).map_or(0, |item| item.review_count());
                (pos, score, reviews)
            })
            .collect();
        sort_desc_by2(&mut ranked, |e| e.1, |e| e.2 as f64);
        ranked.truncate(top_n);
        Hits::new(
            ranked
                .into_iter()
                .map(|(index, score, _)| HitEntry { index, score })
                .collect(),
        )
    }

    /// Neighbours above `min_similarity`, best first, cut to `k_neighbors`
    fn select_neighbours<T>(&self, mut scored: Vec<(T, f64)>) -> Vec<(T, f64)> {
        scored.retain(|(_, sim)| *sim > self.config.min_similarity);
        scored.sort_by(|a, b| cmp_desc(a.1, b.1));
        if let Some(k) = self.config.k_neighbors {
            scored.truncate(k);
        }
        scored
    }

    /// Similarity-weighted average of neighbour ratings, per unrated item
    fn predict_user_based(&self, matrix: &RatingMatrix, user_id: u64, target: &RatingRow) -> Vec<(usize, f64)> {
        let others: Vec<(u64, &RatingRow)> = matrix.rows().filter(|(u, _)| *u != user_id).collect();
        let scored: Vec<(&RatingRow, f64)> = others
            .par_iter()
            .map(|(_, row)| (*row, target.similarity(row, self.config.metric)))
            .collect();
        let neighbours = self.select_neighbours(scored);
        debug!(user_id, neighbours = neighbours.len(), "user neighbourhood");

        let mut num = vec![0.0f64; matrix.item_count()];
        let mut den = vec![0.0f64; matrix.item_count()];
        for (row, sim) in &neighbours {
            for (pos, rating) in row.iter() {
                if target.contains(pos) {
                    continue;
                }
                num[pos] += sim * rating;
                den[pos] += sim.abs();
            }
        }
        (0..matrix.item_count())
            .filter(|&pos| den[pos] > 0.0)
            .map(|pos| (pos, num[pos] / den[pos]))
            .collect()
    }

    /// For each unrated item, weighted average of the user's own ratings
    /// on the items most similar to it
    fn predict_item_based(&self, matrix: &RatingMatrix, target: &RatingRow) -> Vec<(usize, f64)> {
        let item_rows = matrix.item_rows();
        let rated: Vec<(usize, f64)> = target.iter().collect();
        (0..matrix.item_count())
            .into_par_iter()
            .filter(|&pos| !target.contains(pos) && !item_rows[pos].is_empty())
            .filter_map(|pos| {
                let scored: Vec<(f64, f64)> = rated
                    .iter()
                    .map(|&(own, rating)| (rating, item_rows[pos].similarity(&item_rows[own], self.config.metric)))
                    .collect();
                let neighbours = self.select_neighbours(scored);
                let den: f64 = neighbours.iter().map(|(_, sim)| sim.abs()).sum();
                if den > 0.0 {
                    let num: f64 = neighbours.iter().map(|(rating, sim)| sim * rating).sum();
                    Some((pos, num / den))
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{Interaction, Item},
        config::RatingSimilarity,
    };

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Item::new(1, "a").with_rating(3.0, 5),
            Item::new(2, "b").with_rating(4.5, 40),
            Item::new(3, "c").with_rating(2.0, 1),
            Item::new(4, "d").with_rating(4.5, 90),
            Item::new(5, "e"),
        ])
    }

    fn log() -> Arc<InteractionLog> {
        Arc::new(
            vec![
                // user 1 likes 1, 2
                Interaction::new(1, 1, 5.0),
                Interaction::new(1, 2, 4.0),
                // user 2 agrees with user 1 and also rated 3
                Interaction::new(2, 1, 5.0),
                Interaction::new(2, 2, 4.0),
                Interaction::new(2, 3, 2.0),
                // user 3 shares item 1 and rated 4 highly
                Interaction::new(3, 1, 4.0),
                Interaction::new(3, 4, 5.0),
                // user 4 has nothing in common with user 1
                Interaction::new(4, 5, 5.0),
            ]
            .into_iter()
            .collect(),
        )
    }

    fn ranker(mode: CollaborativeMode) -> CollaborativeRanker {
        CollaborativeRanker::new(CollaborativeConfig { mode, ..CollaborativeConfig::default() }, log())
    }

    #[test]
    fn unknown_user_equals_popularity() {
        let cat = catalog();
        let hits = ranker(CollaborativeMode::UserBased).recommend(&cat, UNKNOWN_USER, 3);
        assert_eq!(hits, PopularityRanker.rank(&cat, 3));
    }

    #[test]
    fn user_without_history_equals_popularity() {
        let cat = catalog();
        let hits = ranker(CollaborativeMode::UserBased).recommend(&cat, 42, 5);
        assert_eq!(hits, PopularityRanker.rank(&cat, 5));
    }

    #[test]
    fn user_outside_filtered_catalog_equals_popularity() {
        let cat = catalog().filter(|item| item.id >= 3);
        // user 1 only rated items 1 and 2, both filtered out
        let hits = ranker(CollaborativeMode::UserBased).recommend(&cat, 1, 5);
        assert_eq!(hits, PopularityRanker.rank(&cat, 5));
    }

    #[test]
    fn user_based_predicts_unrated_items_only() {
        let cat = catalog();
        let hits = ranker(CollaborativeMode::UserBased).recommend(&cat, 1, 5);
        let idx = hits.indices();
        // items 1, 2 already rated; item 5 only rated by an unrelated user
        assert!(!idx.contains(&0) && !idx.contains(&1) && !idx.contains(&4));
        // item 4 (predicted 5.0) above item 3 (predicted 2.0)
        assert_eq!(idx, vec![3, 2]);
        assert!((hits.list[0].score - 5.0).abs() < 1e-12);
        assert!((hits.list[1].score - 2.0).abs() < 1e-12);
    }

    #[test]
    fn equal_predictions_break_ties_by_reviews() {
        let log = Arc::new(
            vec![
                Interaction::new(1, 1, 5.0),
                Interaction::new(2, 1, 5.0),
                Interaction::new(2, 2, 4.0),
                Interaction::new(2, 4, 4.0),
            ]
            .into_iter()
            .collect::<InteractionLog>(),
        );
        let ranker = CollaborativeRanker::new(CollaborativeConfig::default(), log);
        // items 2 and 4 both predict 4.0; item 4 has more reviews
        assert_eq!(ranker.recommend(&catalog(), 1, 5).indices(), vec![3, 1]);
    }

    #[test]
    fn k_neighbours_limits_contributors() {
        let config = CollaborativeConfig {
            k_neighbors: Some(1),
            ..CollaborativeConfig::default()
        };
        let hits = CollaborativeRanker::new(config, log()).recommend(&catalog(), 1, 5);
        // users 2 and 3 both score 1.0 on their single shared item; user 2
        // comes first in interaction order and is the only neighbour kept
        assert_eq!(hits.indices(), vec![2]);
    }

    #[test]
    fn item_based_ranks_co_rated_items() {
        let cat = catalog();
        let hits = ranker(CollaborativeMode::ItemBased).recommend(&cat, 1, 5);
        // item 4 only resembles item 1 (rated 5); item 3 resembles both (5 and 4)
        assert_eq!(hits.indices(), vec![3, 2]);
        assert!((hits.list[0].score - 5.0).abs() < 1e-12);
        assert!((hits.list[1].score - 4.5).abs() < 1e-12);
    }

    #[test]
    fn pearson_mode_never_produces_nan() {
        let config = CollaborativeConfig {
            metric: RatingSimilarity::Pearson,
            min_similarity: -1.0,
            ..CollaborativeConfig::default()
        };
        let hits = CollaborativeRanker::new(config, log()).recommend(&catalog(), 2, 5);
        assert!(hits.list.iter().all(|e| !e.score.is_nan()));
    }
}
