use std::{collections::HashMap, fs, path::Path};

use ahash::RandomState;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// User id reserved for "no / unknown user"
pub const UNKNOWN_USER: u64 = 0;

/// Catalog value used by `with_main_category` to mean "no filter"
pub const ALL_CATEGORIES: &str = "All";

/// One catalog row.
/// Optional fields are substituted (0 / empty) by the accessors, never rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Item {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub main_category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Item {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn with_rating(mut self, rating: f64, review_count: u64) -> Self {
        self.rating = Some(rating);
        self.review_count = Some(review_count);
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_main_category(mut self, main_category: impl Into<String>) -> Self {
        self.main_category = Some(main_category.into());
        self
    }

    /// rating for ranking; missing or non-finite counts as 0
    #[inline]
    pub fn rating(&self) -> f64 {
        match self.rating {
            Some(r) if r.is_finite() => r,
            _ => 0.0,
        }
    }

    #[inline]
    pub fn review_count(&self) -> u64 {
        self.review_count.unwrap_or(0)
    }

    /// tags for vectorization; missing is the empty string
    #[inline]
    pub fn tags(&self) -> &str {
        self.tags.as_deref().unwrap_or("")
    }

    #[inline]
    pub fn brand(&self) -> &str {
        self.brand.as_deref().unwrap_or("")
    }
}

/// Immutable, position-indexed item table shared by every ranker.
///
/// Catalog position `i` is the row used for vector `i` and similarity row `i`.
/// Filtering builds a new `Catalog`; the source is never mutated.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Item>,
    id_index: HashMap<u64, usize, RandomState>,
}

impl Catalog {
    pub fn new(items: Vec<Item>) -> Self {
        let mut id_index = HashMap::with_capacity_and_hasher(items.len(), RandomState::new());
        for (pos, item) in items.iter().enumerate() {
            if id_index.contains_key(&item.id) {
                // first row keeps the id
                warn!(id = item.id, position = pos, "duplicate item id in catalog");
                continue;
            }
            id_index.insert(item.id, pos);
        }
        Self { items, id_index }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn get(&self, pos: usize) -> Option<&Item> {
        self.items.get(pos)
    }

    #[inline]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Catalog position of an item id
    #[inline]
    pub fn position_of_id(&self, id: u64) -> Option<usize> {
        self.id_index.get(&id).copied()
    }

    /// Order-preserving subset
    pub fn filter<F>(&self, mut pred: F) -> Catalog
    where
        F: FnMut(&Item) -> bool,
    {
        Catalog::new(self.items.iter().filter(|item| pred(item)).cloned().collect())
    }

    /// Subset whose `main_category` equals `name`; `"All"` keeps everything
    pub fn with_main_category(&self, name: &str) -> Catalog {
        if name == ALL_CATEGORIES {
            return self.clone();
        }
        self.filter(|item| item.main_category.as_deref() == Some(name))
    }

    /// Distinct main categories, sorted
    pub fn main_categories(&self) -> Vec<String> {
        let mut cats: Vec<String> = self
            .items
            .iter()
            .filter_map(|item| item.main_category.clone())
            .collect();
        cats.sort();
        cats.dedup();
        cats
    }

    /// First item whose name equals `name` exactly
    pub fn find_exact_name(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|item| item.name == name)
    }

    /// First item (catalog order) whose lowercased name contains the
    /// trimmed, lowercased query. Blank queries resolve to nothing.
    pub fn find_name_containing(&self, query: &str) -> Option<usize> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.items
            .iter()
            .position(|item| item.name.to_lowercase().contains(&needle))
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        let items: Vec<Item> = serde_cbor::from_slice(bytes)?;
        Ok(Self::new(items))
    }

    pub fn from_cbor_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_cbor(&bytes)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(&self.items)?)
    }
}

impl FromIterator<Item> for Catalog {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Catalog::new(iter.into_iter().collect())
    }
}

/// One historical rating (or implicit weight) of an item by a user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: u64,
    pub item_id: u64,
    pub rating: f64,
}

impl Interaction {
    pub fn new(user_id: u64, item_id: u64, rating: f64) -> Self {
        Self { user_id, item_id, rating }
    }
}

/// Interaction records as handed over by the external store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionLog {
    records: Vec<Interaction>,
}

impl InteractionLog {
    pub fn new(records: Vec<Interaction>) -> Self {
        Self { records }
    }

    #[inline]
    pub fn records(&self) -> &[Interaction] {
        &self.records
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        let records: Vec<Interaction> = serde_cbor::from_slice(bytes)?;
        Ok(Self::new(records))
    }

    pub fn from_cbor_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_cbor(&bytes)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(&self.records)?)
    }
}

impl FromIterator<Interaction> for InteractionLog {
    fn from_iter<T: IntoIterator<Item = Interaction>>(iter: T) -> Self {
        InteractionLog::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::new(vec![
            Item::new(10, "Nivea Face Cream").with_main_category("Beauty"),
            Item::new(11, "USB Charger").with_main_category("Electronics"),
            Item::new(12, "Face Wash").with_main_category("Beauty"),
        ])
    }

    #[test]
    fn missing_fields_substitute_defaults() {
        let item = Item::new(1, "Bare");
        assert_eq!(item.rating(), 0.0);
        assert_eq!(item.review_count(), 0);
        assert_eq!(item.tags(), "");

        let mut nan = Item::new(2, "Broken");
        nan.rating = Some(f64::NAN);
        assert_eq!(nan.rating(), 0.0);
    }

    #[test]
    fn fuzzy_name_picks_first_in_catalog_order() {
        let catalog = sample();
        assert_eq!(catalog.find_name_containing("  FACE "), Some(0));
        assert_eq!(catalog.find_name_containing("wash"), Some(2));
        assert_eq!(catalog.find_name_containing("toaster"), None);
        assert_eq!(catalog.find_name_containing("   "), None);
    }

    #[test]
    fn filter_keeps_order_and_reindexes() {
        let catalog = sample();
        let beauty = catalog.with_main_category("Beauty");
        assert_eq!(beauty.len(), 2);
        assert_eq!(beauty.get(1).map(|i| i.id), Some(12));
        assert_eq!(beauty.position_of_id(12), Some(1));
        assert_eq!(beauty.position_of_id(11), None);
        assert_eq!(catalog.with_main_category(ALL_CATEGORIES).len(), 3);
        assert_eq!(catalog.main_categories(), vec!["Beauty", "Electronics"]);
    }

    #[test]
    fn duplicate_id_keeps_first_position() {
        let catalog = Catalog::new(vec![Item::new(5, "a"), Item::new(5, "b")]);
        assert_eq!(catalog.position_of_id(5), Some(0));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn cbor_snapshot_tolerates_missing_fields() {
        #[derive(Serialize)]
        struct Sparse {
            id: u64,
            name: String,
        }
        let bytes = serde_cbor::to_vec(&vec![Sparse { id: 3, name: "x".into() }]).unwrap();
        let catalog = Catalog::from_cbor(&bytes).unwrap();
        assert_eq!(catalog.get(0).map(|i| i.tags()), Some(""));
    }
}
