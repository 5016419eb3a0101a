use tracing::trace;

use crate::{
    catalog::Catalog,
    ranker::{HitEntry, Hits},
    utils::sort::sort_desc_by2,
};

/// Orders items by rating, then review count, then catalog order.
/// Missing rating / review count rank as 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct PopularityRanker;

impl PopularityRanker {
    pub fn new() -> Self {
        PopularityRanker
    }

    /// Top `top_n` items; the score of each hit is its rating
    pub fn rank(&self, catalog: &Catalog, top_n: usize) -> Hits {
        let mut entries: Vec<(usize, f64, u64)> = catalog
            .iter()
            .enumerate()
            .map(|(pos, item)| (pos, item.rating(), item.review_count()))
            .collect();
        sort_desc_by2(&mut entries, |e| e.1, |e| e.2 as f64);
        entries.truncate(top_n);
        trace!(candidates = catalog.len(), returned = entries.len(), "popularity ranking");
        Hits::new(
            entries
                .into_iter()
                .map(|(index, score, _)| HitEntry { index, score })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Item;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Item::new(1, "a").with_rating(4.0, 10),
            Item::new(2, "b"),
            Item::new(3, "c").with_rating(4.0, 50),
            Item::new(4, "d").with_rating(5.0, 1),
            Item::new(5, "e").with_rating(4.0, 10),
        ])
    }

    #[test]
    fn rating_then_reviews_then_catalog_order() {
        let hits = PopularityRanker.rank(&catalog(), 10);
        assert_eq!(hits.indices(), vec![3, 2, 0, 4, 1]);
        assert_eq!(hits.list[0].score, 5.0);
        assert_eq!(hits.list[4].score, 0.0);
    }

    #[test]
    fn truncates_to_top_n() {
        assert_eq!(PopularityRanker.rank(&catalog(), 2).indices(), vec![3, 2]);
        assert!(PopularityRanker.rank(&catalog(), 0).is_empty());
    }

    #[test]
    fn empty_catalog_gives_empty_hits() {
        assert!(PopularityRanker.rank(&Catalog::default(), 5).is_empty());
    }

    #[test]
    fn output_is_sorted_for_filtered_subsets() {
        let full = catalog();
        let subset = full.filter(|item| item.id % 2 == 1);
        let hits = PopularityRanker.rank(&subset, 10);
        for pair in hits.list.windows(2) {
            let (a, b) = (subset.get(pair[0].index).unwrap(), subset.get(pair[1].index).unwrap());
            assert!(
                a.rating() > b.rating()
                    || (a.rating() == b.rating() && a.review_count() > b.review_count())
                    || (a.rating() == b.rating() && a.review_count() == b.review_count() && pair[0].index < pair[1].index)
            );
        }
    }
}
