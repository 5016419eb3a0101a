use std::cmp::Ordering;

/// Map a score onto a total order usable for ranking:
/// NaN sinks to the bottom and -0.0 collapses onto 0.0.
#[inline(always)]
fn rank_key(v: f64) -> f64 {
    if v.is_nan() {
        f64::NEG_INFINITY
    } else if v == 0.0 {
        0.0
    } else {
        v
    }
}

/// Descending comparison of two scores
#[inline(always)]
pub fn cmp_desc(a: f64, b: f64) -> Ordering {
    rank_key(b).total_cmp(&rank_key(a))
}

/// Positions `0..scores.len()` ordered by score descending.
/// Stable: equal scores keep ascending position order.
pub fn argsort_desc(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| cmp_desc(scores[a], scores[b]));
    order
}

/// Stable descending sort of `entries` by a primary and a secondary score.
/// Entries that tie on both keep their incoming order.
pub fn sort_desc_by2<T, F, G>(entries: &mut [T], primary: F, secondary: G)
where
    F: Fn(&T) -> f64,
    G: Fn(&T) -> f64,
{
    entries.sort_by(|a, b| {
        cmp_desc(primary(a), primary(b)).then_with(|| cmp_desc(secondary(a), secondary(b)))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    /// tiny deterministic PRNG (xorshift32)
    struct Rng(u32);
    impl Rng {
        fn new(seed: u32) -> Self {
            Self(seed)
        }

        fn next_u32(&mut self) -> u32 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            self.0 = x;
            x
        }
    }

    /// baseline: sort by (score desc, position asc) explicitly
    fn baseline(scores: &[f64]) -> Vec<usize> {
        let mut pairs: Vec<(usize, f64)> = scores.iter().copied().enumerate().collect();
        pairs.sort_unstable_by(|a, b| {
            b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0))
        });
        pairs.into_iter().map(|(i, _)| i).collect()
    }

    #[test]
    fn argsort_handles_empty_and_single() {
        assert!(argsort_desc(&[]).is_empty());
        assert_eq!(argsort_desc(&[0.3]), vec![0]);
    }

    #[test]
    fn argsort_is_stable_on_ties() {
        let scores = [0.5, 1.0, 0.5, 1.0, 0.0];
        assert_eq!(argsort_desc(&scores), vec![1, 3, 0, 2, 4]);
    }

    #[test]
    fn argsort_matches_baseline_many_sizes() {
        let mut rng = Rng::new(0x1234_5678);
        for &n in &[2usize, 3, 7, 16, 33, 128, 1024] {
            // few distinct values so ties are common
            let scores: Vec<f64> = (0..n).map(|_| (rng.next_u32() % 8) as f64 / 8.0).collect();
            assert_eq!(argsort_desc(&scores), baseline(&scores), "mismatch at n={n}");
        }
    }

    #[test]
    fn nan_sinks_and_negative_zero_ties() {
        let scores = [f64::NAN, -0.0, 0.0, -1.0];
        assert_eq!(argsort_desc(&scores), vec![1, 2, 3, 0]);
    }

    #[test]
    fn secondary_key_breaks_primary_ties() {
        let mut entries = vec![(0usize, 4.0, 10.0), (1, 5.0, 1.0), (2, 4.0, 30.0), (3, 4.0, 10.0)];
        sort_desc_by2(&mut entries, |e| e.1, |e| e.2);
        let order: Vec<usize> = entries.iter().map(|e| e.0).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }
}
