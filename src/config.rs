use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How the anchor item is kept out of content-similarity results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AnchorExclusion {
    /// Skip the first ranked slot after sorting.
    /// An item with tags identical to the anchor may still show up.
    #[default]
    Positional,
    /// Drop the anchor's own catalog position, wherever it ranks.
    Identity,
}

/// Whose behaviour is compared in collaborative ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CollaborativeMode {
    /// target user vs. every other user
    #[default]
    UserBased,
    /// candidate item vs. items the target user rated
    ItemBased,
}

/// Vector similarity over co-rated entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RatingSimilarity {
    #[default]
    Cosine,
    /// mean-centered over the shared entries
    Pearson,
}

/// Proxy ground truth used by the evaluation harness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RelevancePolicy {
    /// items with the same raw `category`
    #[default]
    SameCategory,
    /// same raw `category`, or same brand as the query item
    SameCategoryOrBrand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub remove_stop_words: bool,
    /// shortest token kept by the tokenizer (in chars)
    pub min_token_len: usize,
    pub exclusion: AnchorExclusion,
    /// memoize similarity matrices by tag-corpus fingerprint
    pub cache: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            remove_stop_words: true,
            min_token_len: 2,
            exclusion: AnchorExclusion::Positional,
            cache: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaborativeConfig {
    pub mode: CollaborativeMode,
    pub metric: RatingSimilarity,
    /// keep only the k most similar neighbours; `None` keeps all of them
    pub k_neighbors: Option<usize>,
    /// neighbours must be strictly more similar than this
    pub min_similarity: f64,
}

impl Default for CollaborativeConfig {
    fn default() -> Self {
        Self {
            mode: CollaborativeMode::UserBased,
            metric: RatingSimilarity::Cosine,
            k_neighbors: None,
            min_similarity: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EvaluationConfig {
    pub relevance: RelevancePolicy,
}

/// Top-level settings shared by the rankers and the harness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    pub default_top_n: usize,
    pub content: ContentConfig,
    pub collaborative: CollaborativeConfig,
    pub evaluation: EvaluationConfig,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            default_top_n: 10,
            content: ContentConfig::default(),
            collaborative: CollaborativeConfig::default(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

impl RecommenderConfig {
    /// Read a CBOR-encoded config and validate it
    pub fn from_cbor_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        let config: Self = serde_cbor::from_slice(&bytes)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.content.min_token_len == 0 {
            return Err(Error::InvalidConfig("content.min_token_len must be at least 1".into()));
        }
        if self.collaborative.k_neighbors == Some(0) {
            return Err(Error::InvalidConfig("collaborative.k_neighbors must be positive".into()));
        }
        if !self.collaborative.min_similarity.is_finite() {
            return Err(Error::InvalidConfig("collaborative.min_similarity must be finite".into()));
        }
        Ok(())
    }
}
