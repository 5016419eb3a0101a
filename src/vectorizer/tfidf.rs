use crate::{utils::math::vector::SparseVec, vectorizer::{corpus::Corpus, term::TermFrequency}};

pub trait TfIdfEngine<N>
where
    N: num::Num + Copy,
{
    /// IDF vector over the corpus vocabulary, in dimension order
    ///
    /// # Arguments
    /// * `corpus` - vocabulary and document frequencies
    fn idf_vec(corpus: &Corpus) -> Vec<N>;

    /// Weighted vector of one document.
    /// Terms missing from the corpus are ignored; an empty document
    /// yields the zero vector of full dimension.
    ///
    /// # Arguments
    /// * `freq` - term counts of the document
    /// * `corpus` - vocabulary the dimensions refer to
    /// * `idf` - output of `idf_vec` for the same corpus
    fn tf_idf_vec(freq: &TermFrequency, corpus: &Corpus, idf: &[N]) -> SparseVec<N>;
}

/// Default TF-IDF engine
/// raw term counts, smoothed idf `ln((1 + n) / (1 + df)) + 1`,
/// rows scaled to unit L2 norm.
/// Supports `f32` and `f64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTfIdfEngine;

impl DefaultTfIdfEngine {
    #[inline]
    fn smooth_idf(doc_num: u64, doc_freq: u64) -> f64 {
        ((1.0 + doc_num as f64) / (1.0 + doc_freq as f64)).ln() + 1.0
    }
}

impl TfIdfEngine<f64> for DefaultTfIdfEngine {
    fn idf_vec(corpus: &Corpus) -> Vec<f64> {
        let doc_num = corpus.doc_num();
        corpus
            .doc_freqs()
            .map(|df| Self::smooth_idf(doc_num, df))
            .collect()
    }

    fn tf_idf_vec(freq: &TermFrequency, corpus: &Corpus, idf: &[f64]) -> SparseVec<f64> {
        let pairs: Vec<(u32, f64)> = freq
            .iter()
            .filter_map(|(term, count)| {
                let dim = corpus.dim_of(term)?;
                Some((dim as u32, count as f64 * idf.get(dim).copied().unwrap_or(0.0)))
            })
            .collect();
        let mut vec = SparseVec::from_pairs(corpus.vocab_size(), pairs);
        vec.l2_normalize();
        vec
    }
}

impl TfIdfEngine<f32> for DefaultTfIdfEngine {
    fn idf_vec(corpus: &Corpus) -> Vec<f32> {
        let doc_num = corpus.doc_num();
        corpus
            .doc_freqs()
            .map(|df| Self::smooth_idf(doc_num, df) as f32)
            .collect()
    }

    fn tf_idf_vec(freq: &TermFrequency, corpus: &Corpus, idf: &[f32]) -> SparseVec<f32> {
        let pairs: Vec<(u32, f32)> = freq
            .iter()
            .filter_map(|(term, count)| {
                let dim = corpus.dim_of(term)?;
                Some((dim as u32, count as f32 * idf.get(dim).copied().unwrap_or(0.0)))
            })
            .collect();
        let mut vec = SparseVec::from_pairs(corpus.vocab_size(), pairs);
        vec.l2_normalize();
        vec
    }
}
