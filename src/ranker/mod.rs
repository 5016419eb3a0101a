pub mod collaborative;
pub mod content;
pub mod popularity;
pub mod ratings;
pub mod recommender;

use std::fmt::{self, Debug, Display};

use serde::Serialize;

use crate::catalog::{Catalog, Item};

/// One ranked catalog position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitEntry {
    /// position in the catalog the ranker was given
    pub index: usize,
    /// ranker-specific score (similarity, predicted rating, or rating)
    pub score: f64,
}

/// Ranked output of one ranker call, best first.
/// Positions refer to the catalog passed to that call.
#[derive(Clone, PartialEq, Default)]
pub struct Hits {
    pub list: Vec<HitEntry>,
}

impl Hits {
    pub fn new(list: Vec<HitEntry>) -> Self {
        Hits { list }
    }

    pub fn empty() -> Self {
        Hits { list: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// catalog positions in rank order
    pub fn indices(&self) -> Vec<usize> {
        self.list.iter().map(|e| e.index).collect()
    }

    /// Display records in rank order
    pub fn records<'a>(&self, catalog: &'a Catalog) -> Vec<DisplayRecord<'a>> {
        self.list
            .iter()
            .filter_map(|e| catalog.get(e.index).map(|item| DisplayRecord::new(item, e.score)))
            .collect()
    }
}

impl Debug for Hits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Hits [")?;
            for e in &self.list {
                writeln!(f, "    #{}: {:.6}", e.index, e.score)?;
            }
            write!(f, "]")
        } else {
            f.debug_list().entries(self.list.iter().map(|e| (e.index, e.score))).finish()
        }
    }
}

/// The fields a caller needs to show one recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRecord<'a> {
    pub name: &'a str,
    pub brand: Option<&'a str>,
    pub rating: f64,
    pub review_count: u64,
    pub image_url: Option<&'a str>,
    pub score: f64,
}

impl<'a> DisplayRecord<'a> {
    pub fn new(item: &'a Item, score: f64) -> Self {
        Self {
            name: &item.name,
            brand: item.brand.as_deref(),
            rating: item.rating(),
            review_count: item.review_count(),
            image_url: item.image_url.as_deref(),
            score,
        }
    }
}

impl Display for DisplayRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}\t{}", self.score, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_follow_rank_order_and_substitute_defaults() {
        let catalog = Catalog::new(vec![
            Item::new(1, "first").with_brand("acme"),
            Item::new(2, "second").with_rating(4.5, 12),
        ]);
        let hits = Hits::new(vec![
            HitEntry { index: 1, score: 0.9 },
            HitEntry { index: 0, score: 0.1 },
        ]);
        let recs = hits.records(&catalog);
        assert_eq!(recs[0].name, "second");
        assert_eq!(recs[0].review_count, 12);
        assert_eq!(recs[1].brand, Some("acme"));
        assert_eq!(recs[1].rating, 0.0);
        assert_eq!(recs[1].to_string(), "0.100000\tfirst");
        assert_eq!(hits.indices(), vec![1, 0]);
    }
}
