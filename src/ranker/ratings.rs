use std::{cmp::Ordering, collections::BTreeMap};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::{
    catalog::{Catalog, InteractionLog, UNKNOWN_USER},
    config::RatingSimilarity,
};

/// Explicit ratings of one user (or of one item), sorted by position.
/// Absent positions mean "no opinion"; a stored 0.0 is a real rating.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingRow {
    entries: Vec<(usize, f64)>,
}

impl RatingRow {
    fn from_sorted(entries: Vec<(usize, f64)>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
        Self { entries }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, pos: usize) -> Option<f64> {
        self.entries
            .binary_search_by_key(&pos, |e| e.0)
            .ok()
            .map(|i| self.entries[i].1)
    }

    #[inline]
    pub fn contains(&self, pos: usize) -> bool {
        self.get(pos).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// `(a, b)` rating pairs on positions both rows rated
    fn co_rated<'a>(&'a self, other: &'a RatingRow) -> Vec<(f64, f64)> {
        let (a, b) = (&self.entries, &other.entries);
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                Ordering::Equal => {
                    out.push((a[i].1, b[j].1));
                    i += 1;
                    j += 1;
                }
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
            }
        }
        out
    }

    /// Similarity over co-rated positions only.
    /// No overlap, or a zero denominator, gives 0.0.
    pub fn similarity(&self, other: &RatingRow, metric: RatingSimilarity) -> f64 {
        let pairs = self.co_rated(other);
        if pairs.is_empty() {
            return 0.0;
        }
        let (shift_a, shift_b) = match metric {
            RatingSimilarity::Cosine => (0.0, 0.0),
            RatingSimilarity::Pearson => {
                let n = pairs.len() as f64;
                (
                    pairs.iter().map(|p| p.0).sum::<f64>() / n,
                    pairs.iter().map(|p| p.1).sum::<f64>() / n,
                )
            }
        };
        let mut dot = 0.0;
        let mut norm_a = 0.0;
        let mut norm_b = 0.0;
        for (a, b) in pairs {
            let (a, b) = (a - shift_a, b - shift_b);
            dot += a * b;
            norm_a += a * a;
            norm_b += b * b;
        }
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        let score = dot / (norm_a.sqrt() * norm_b.sqrt());
        if score.is_finite() { score } else { 0.0 }
    }
}

/// Sparse user x item rating matrix restricted to one catalog.
///
/// Item columns are catalog positions. Users keep first-seen order.
/// Built per ranking call from the raw interaction log.
#[derive(Debug, Clone, Default)]
pub struct RatingMatrix {
    users: IndexMap<u64, RatingRow>,
    item_count: usize,
}

impl RatingMatrix {
    /// Drops records for the reserved user 0, for item ids outside the
    /// catalog and with non-finite ratings. A repeated (user, item) pair
    /// keeps its last rating.
    pub fn build(catalog: &Catalog, log: &InteractionLog) -> Self {
        let mut rows: IndexMap<u64, BTreeMap<usize, f64>> = IndexMap::new();
        let mut reserved = 0usize;
        let mut outside = 0usize;
        let mut invalid = 0usize;
        for rec in log.records() {
            if rec.user_id == UNKNOWN_USER {
                reserved += 1;
                continue;
            }
            if !rec.rating.is_finite() {
                invalid += 1;
                continue;
            }
            let Some(pos) = catalog.position_of_id(rec.item_id) else {
                outside += 1;
                continue;
            };
            rows.entry(rec.user_id).or_default().insert(pos, rec.rating);
        }
        if reserved > 0 {
            warn!(records = reserved, "interactions for reserved user 0 ignored");
        }
        if invalid > 0 {
            warn!(records = invalid, "interactions with non-finite rating ignored");
        }
        debug!(
            users = rows.len(),
            items = catalog.len(),
            outside_catalog = outside,
            "built rating matrix"
        );
        let users = rows
            .into_iter()
            .map(|(user, row)| (user, RatingRow::from_sorted(row.into_iter().collect())))
            .collect();
        Self { users, item_count: catalog.len() }
    }

    #[inline]
    pub fn user_num(&self) -> usize {
        self.users.len()
    }

    #[inline]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    #[inline]
    pub fn user_row(&self, user_id: u64) -> Option<&RatingRow> {
        self.users.get(&user_id)
    }

    /// `(user_id, row)` in first-seen order
    pub fn rows(&self) -> impl Iterator<Item = (u64, &RatingRow)> {
        self.users.iter().map(|(&u, r)| (u, r))
    }

    /// Item-major view: row `i` holds the ratings of catalog position `i`,
    /// keyed by the user's row index in this matrix.
    pub fn item_rows(&self) -> Vec<RatingRow> {
        let mut cols: Vec<Vec<(usize, f64)>> = vec![Vec::new(); self.item_count];
        for (u_idx, row) in self.users.values().enumerate() {
            for (pos, rating) in row.iter() {
                cols[pos].push((u_idx, rating));
            }
        }
        cols.into_iter().map(RatingRow::from_sorted).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Interaction, Item};

    fn catalog() -> Catalog {
        Catalog::new((1..=4).map(|id| Item::new(id, format!("item {id}"))).collect())
    }

    #[test]
    fn build_drops_reserved_unknown_and_invalid() {
        let log: InteractionLog = vec![
            Interaction::new(0, 1, 5.0),
            Interaction::new(7, 99, 5.0),
            Interaction::new(7, 2, f64::NAN),
            Interaction::new(7, 3, 4.0),
            Interaction::new(7, 3, 2.0),
            Interaction::new(8, 1, 0.0),
        ]
        .into_iter()
        .collect();
        let m = RatingMatrix::build(&catalog(), &log);
        assert_eq!(m.user_num(), 2);
        assert!(m.user_row(0).is_none());
        assert_eq!(m.user_row(7).unwrap().iter().collect::<Vec<_>>(), vec![(2, 2.0)]);
        // explicit zero rating is kept
        assert_eq!(m.user_row(8).unwrap().get(0), Some(0.0));
    }

    #[test]
    fn similarity_ignores_unshared_entries() {
        let a = RatingRow::from_sorted(vec![(0, 5.0), (1, 3.0), (3, 1.0)]);
        let b = RatingRow::from_sorted(vec![(0, 5.0), (1, 3.0), (2, 4.0)]);
        assert!((a.similarity(&b, RatingSimilarity::Cosine) - 1.0).abs() < 1e-12);
        let c = RatingRow::from_sorted(vec![(2, 4.0)]);
        assert_eq!(a.similarity(&c, RatingSimilarity::Cosine), 0.0);
    }

    #[test]
    fn pearson_detects_opposite_taste_and_guards_flat_rows() {
        let a = RatingRow::from_sorted(vec![(0, 5.0), (1, 1.0)]);
        let b = RatingRow::from_sorted(vec![(0, 1.0), (1, 5.0)]);
        assert!((a.similarity(&b, RatingSimilarity::Pearson) + 1.0).abs() < 1e-12);
        let flat = RatingRow::from_sorted(vec![(0, 3.0), (1, 3.0)]);
        let s = a.similarity(&flat, RatingSimilarity::Pearson);
        assert_eq!(s, 0.0);
        assert!(!s.is_nan());
    }

    #[test]
    fn item_rows_transpose() {
        let log: InteractionLog = vec![Interaction::new(7, 1, 4.0), Interaction::new(8, 1, 2.0)]
            .into_iter()
            .collect();
        let m = RatingMatrix::build(&catalog(), &log);
        let items = m.item_rows();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].iter().collect::<Vec<_>>(), vec![(0, 4.0), (1, 2.0)]);
        assert!(items[1].is_empty());
    }
}
