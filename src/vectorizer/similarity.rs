use std::{hash::{BuildHasher, Hash, Hasher}, sync::Arc};

use ahash::RandomState;
use dashmap::DashMap;
use num::Num;
use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::{catalog::Catalog, config::ContentConfig, utils::math::vector::SparseVec};

/// Dense, square, symmetric cosine-similarity matrix.
/// Row `i` and column `i` refer to vector (and catalog row) `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    /// row-major
    data: Vec<f64>,
}

impl SimilarityMatrix {
    /// Pairwise cosine similarity of every vector pair.
    /// Zero vectors score 0.0 against everything, themselves included.
    pub fn from_vectors<N>(vectors: &[SparseVec<N>]) -> Self
    where
        N: Num + Copy + Into<f64> + Send + Sync,
    {
        let size = vectors.len();
        // 行ごとに並列計算、collect で順序は保たれる
        let rows: Vec<Vec<f64>> = vectors
            .par_iter()
            .map(|a| vectors.iter().map(|b| a.cosine_similarity(b)).collect())
            .collect();
        let mut data = Vec::with_capacity(size * size);
        for row in rows {
            data.extend(row);
        }
        trace!(size, "built similarity matrix");
        Self { size, data }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// similarities of item `i` to every item
    #[inline]
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i >= self.size {
            return None;
        }
        Some(&self.data[i * self.size..(i + 1) * self.size])
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.size || j >= self.size {
            return None;
        }
        Some(self.data[i * self.size + j])
    }
}

/// Fixed seeds so fingerprints are stable across processes
const FINGERPRINT_SEEDS: (u64, u64, u64, u64) = (
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
);

/// Content fingerprint of a catalog's tag corpus under the given settings.
/// Row order matters: the same tags in another order fingerprint differently.
pub fn tag_fingerprint(catalog: &Catalog, config: &ContentConfig) -> u64 {
    let state = RandomState::with_seeds(
        FINGERPRINT_SEEDS.0,
        FINGERPRINT_SEEDS.1,
        FINGERPRINT_SEEDS.2,
        FINGERPRINT_SEEDS.3,
    );
    let mut hasher = state.build_hasher();
    catalog.len().hash(&mut hasher);
    for item in catalog.iter() {
        item.tags().hash(&mut hasher);
    }
    config.remove_stop_words.hash(&mut hasher);
    config.min_token_len.hash(&mut hasher);
    hasher.finish()
}

/// Memoized similarity matrices keyed by `tag_fingerprint`.
///
/// Identical tag corpora give identical matrices, so a hit returns exactly
/// what a rebuild would. Call `clear` when the catalog is reloaded.
#[derive(Debug, Default)]
pub struct SimilarityCache {
    entries: DashMap<u64, Arc<SimilarityMatrix>, RandomState>,
}

impl SimilarityCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Cached matrix for `fingerprint`, built on miss.
    /// A cached matrix whose size is not `expected_size` is rebuilt and replaced.
    pub fn get_or_build<F>(
        &self,
        fingerprint: u64,
        expected_size: usize,
        build: F,
    ) -> Arc<SimilarityMatrix>
    where
        F: FnOnce() -> SimilarityMatrix,
    {
        if let Some(hit) = self.entries.get(&fingerprint) {
            if hit.size() == expected_size {
                debug!(fingerprint, "similarity cache hit");
                return Arc::clone(hit.value());
            }
            warn!(
                fingerprint,
                cached = hit.size(),
                expected_size,
                "similarity cache size mismatch"
            );
        } else {
            debug!(fingerprint, "similarity cache miss");
        }
        let matrix = Arc::new(build());
        self.entries.insert(fingerprint, Arc::clone(&matrix));
        matrix
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
