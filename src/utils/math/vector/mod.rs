pub mod math;

use std::fmt::{self, Debug};

use num::Num;
use serde::{Deserialize, Serialize};

/// SparseVec は 0 要素を省いた疎ベクトルです
/// indices と values を SoA で持ち、
/// indices は昇順であることを保証します
///
/// `len` is the logical dimension; only non-zero entries are stored.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVec<N>
where
    N: Num + Copy,
{
    inds: Vec<u32>,
    vals: Vec<N>,
    len: usize,
}

impl<N> SparseVec<N>
where
    N: Num + Copy,
{
    #[inline]
    pub fn new() -> Self {
        Self {
            inds: Vec::new(),
            vals: Vec::new(),
            len: 0,
        }
    }

    /// all-zero vector of dimension `len`
    #[inline]
    pub fn zeros(len: usize) -> Self {
        Self {
            inds: Vec::new(),
            vals: Vec::new(),
            len,
        }
    }

    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inds: Vec::with_capacity(cap),
            vals: Vec::with_capacity(cap),
            len: 0,
        }
    }

    /// Build from unordered `(index, value)` pairs.
    /// Zero values are dropped; later duplicates overwrite earlier ones.
    pub fn from_pairs(len: usize, mut pairs: Vec<(u32, N)>) -> Self {
        // 安定ソートなので重複は後勝ちにできる
        pairs.sort_by_key(|(idx, _)| *idx);
        let mut inds = Vec::with_capacity(pairs.len());
        let mut vals = Vec::with_capacity(pairs.len());
        for (idx, val) in pairs {
            debug_assert!((idx as usize) < len, "index {idx} out of dimension {len}");
            if inds.last() == Some(&idx) {
                inds.pop();
                vals.pop();
            }
            if val != N::zero() {
                inds.push(idx);
                vals.push(val);
            }
        }
        Self { inds, vals, len }
    }

    /// Append the next dense element; zeros only grow the dimension
    #[inline]
    pub fn push(&mut self, elem: N) {
        if elem != N::zero() {
            self.inds.push(self.len as u32);
            self.vals.push(elem);
        }
        self.len += 1;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// number of stored (non-zero) entries
    #[inline]
    pub fn nnz(&self) -> usize {
        self.inds.len()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.inds.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<N> {
        if index >= self.len {
            return None;
        }
        match self.inds.binary_search(&(index as u32)) {
            Ok(pos) => Some(self.vals[pos]),
            Err(_) => Some(N::zero()),
        }
    }

    /// `(index, value)` of the stored entries, ascending by index
    #[inline]
    pub fn raw_iter(&self) -> impl Iterator<Item = (usize, N)> + '_ {
        self.inds
            .iter()
            .zip(self.vals.iter())
            .map(|(&i, &v)| (i as usize, v))
    }

    #[inline]
    pub fn shrink_to_fit(&mut self) {
        self.inds.shrink_to_fit();
        self.vals.shrink_to_fit();
    }

    #[inline]
    pub(crate) fn inds(&self) -> &[u32] {
        &self.inds
    }

    #[inline]
    pub(crate) fn vals(&self) -> &[N] {
        &self.vals
    }

    #[inline]
    pub(crate) fn vals_mut(&mut self) -> &mut [N] {
        &mut self.vals
    }
}

impl<N> Default for SparseVec<N>
where
    N: Num + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N> From<Vec<N>> for SparseVec<N>
where
    N: Num + Copy,
{
    fn from(dense: Vec<N>) -> Self {
        let mut vec = SparseVec::with_capacity(dense.len());
        for elem in dense {
            vec.push(elem);
        }
        vec.shrink_to_fit();
        vec
    }
}

impl<N> Debug for SparseVec<N>
where
    N: Num + Copy + Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.debug_struct("SparseVec")
                .field("len", &self.len)
                .field("nnz", &self.nnz())
                .field("entries", &self.raw_iter().collect::<Vec<_>>())
                .finish()
        } else {
            f.debug_list().entries(self.raw_iter()).finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_skips_zeros_but_counts_dimension() {
        let vec: SparseVec<f64> = SparseVec::from(vec![0.0, 2.0, 0.0, 3.0]);
        assert_eq!(vec.len(), 4);
        assert_eq!(vec.nnz(), 2);
        assert_eq!(vec.get(0), Some(0.0));
        assert_eq!(vec.get(3), Some(3.0));
        assert_eq!(vec.get(4), None);
    }

    #[test]
    fn from_pairs_sorts_and_overwrites() {
        let vec: SparseVec<f32> = SparseVec::from_pairs(5, vec![(4, 1.0), (1, 2.0), (4, 7.0), (2, 0.0)]);
        assert_eq!(vec.raw_iter().collect::<Vec<_>>(), vec![(1, 2.0), (4, 7.0)]);
        assert_eq!(vec.len(), 5);
    }

    #[test]
    fn zeros_has_no_entries() {
        let vec: SparseVec<f64> = SparseVec::zeros(3);
        assert!(vec.is_zero());
        assert_eq!(vec.len(), 3);
    }
}
