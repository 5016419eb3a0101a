use std::{cmp::Ordering, ops::AddAssign};

use num::{Float, Num};

use super::SparseVec;

impl<N> SparseVec<N>
where
    N: Num + Copy,
{
    /// ドット積
    /// d(a, b) = Σ(a_i * b_i)
    ///
    /// merge-join over the two sorted index lists
    #[inline]
    pub fn dot<R>(&self, other: &Self) -> R
    where
        R: Num + AddAssign + Copy,
        N: Into<R>,
    {
        debug_assert_eq!(
            self.len(),
            other.len(),
            "Vectors must be of the same length to compute dot product."
        );
        let mut result = R::zero();
        let (a_inds, a_vals) = (self.inds(), self.vals());
        let (b_inds, b_vals) = (other.inds(), other.vals());
        if a_inds.is_empty() || b_inds.is_empty() {
            return result;
        }
        let mut i = 0;
        let mut j = 0;
        while i < a_inds.len() && j < b_inds.len() {
            match a_inds[i].cmp(&b_inds[j]) {
                Ordering::Equal => {
                    result += a_vals[i].into() * b_vals[j].into();
                    i += 1;
                    j += 1;
                }
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
            }
        }
        result
    }

    #[inline]
    pub fn norm_sq<R>(&self) -> R
    where
        R: Num + AddAssign + Copy,
        N: Into<R>,
    {
        let mut result = R::zero();
        for &v in self.vals() {
            let v: R = v.into();
            result += v * v;
        }
        result
    }

    /// コサイン類似度
    /// cos(θ) = Σ(a_i * b_i) / (||a|| * ||b||)
    ///
    /// A zero-norm side yields exactly 0.0, never NaN.
    #[inline]
    pub fn cosine_similarity(&self, other: &Self) -> f64
    where
        N: Into<f64>,
    {
        let norm_a: f64 = self.norm_sq::<f64>();
        let norm_b: f64 = other.norm_sq::<f64>();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        let score = self.dot::<f64>(other) / (norm_a.sqrt() * norm_b.sqrt());
        if score.is_finite() { score } else { 0.0 }
    }
}

impl<N> SparseVec<N>
where
    N: Float,
{
    /// Scale to unit L2 norm in place; zero vectors stay zero
    pub fn l2_normalize(&mut self) -> &mut Self {
        let mut sum = N::zero();
        for &v in self.vals() {
            sum = sum + v * v;
        }
        if sum > N::zero() {
            let inv = sum.sqrt().recip();
            for v in self.vals_mut() {
                *v = *v * inv;
            }
        }
        self
    }
}
