pub mod corpus;
pub mod similarity;
pub mod stopwords;
pub mod term;
pub mod tfidf;
pub mod tokenizer;

use num::Num;
use tracing::debug;

use crate::{
    utils::math::vector::SparseVec,
    vectorizer::{corpus::Corpus, term::TermFrequency, tfidf::{DefaultTfIdfEngine, TfIdfEngine}, tokenizer::Tokenizer},
};

/// Batch TF-IDF vectorizer over a fixed document list.
///
/// `fit_transform` returns one vector per input document, in input order,
/// so vector `i` always belongs to document `i`. Empty documents keep
/// their slot as a zero vector.
///
/// `TfIdfVectorizer<N, E>` has the following generic parameters:
/// - `N`: vector element type (`f32` or `f64`)
/// - `E`: weighting engine (`DefaultTfIdfEngine`)
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer<N = f64, E = DefaultTfIdfEngine>
where
    N: Num + Copy,
    E: TfIdfEngine<N>,
{
    tokenizer: Tokenizer,
    corpus: Corpus,
    idf: Vec<N>,
    _marker: std::marker::PhantomData<E>,
}

impl<N, E> TfIdfVectorizer<N, E>
where
    N: Num + Copy,
    E: TfIdfEngine<N>,
{
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            corpus: Corpus::new(),
            idf: Vec::new(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Learn vocabulary and idf from `docs`, then weight every document
    pub fn fit_transform<I, S>(&mut self, docs: I) -> Vec<SparseVec<N>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let freqs: Vec<TermFrequency> = docs
            .into_iter()
            .map(|doc| self.tokenizer.tokenize(doc.as_ref()).into_iter().collect())
            .collect();

        let mut corpus = Corpus::new();
        for freq in &freqs {
            corpus.add_doc(freq);
        }
        self.idf = E::idf_vec(&corpus);
        self.corpus = corpus;
        debug!(docs = freqs.len(), vocab = self.corpus.vocab_size(), "fitted tf-idf vocabulary");

        freqs
            .iter()
            .map(|freq| E::tf_idf_vec(freq, &self.corpus, &self.idf))
            .collect()
    }

    /// Weight a new text against the fitted vocabulary
    pub fn transform(&self, text: &str) -> SparseVec<N> {
        let freq: TermFrequency = self.tokenizer.tokenize(text).into_iter().collect();
        E::tf_idf_vec(&freq, &self.corpus, &self.idf)
    }

    #[inline]
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    #[inline]
    pub fn idf(&self) -> &[N] {
        &self.idf
    }
}

impl<N, E> Default for TfIdfVectorizer<N, E>
where
    N: Num + Copy,
    E: TfIdfEngine<N>,
{
    fn default() -> Self {
        Self::new(Tokenizer::default())
    }
}
