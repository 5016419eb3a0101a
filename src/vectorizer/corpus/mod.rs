use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::vectorizer::term::TermFrequency;

/// Vocabulary and document frequencies of one tag corpus.
///
/// The position of a term in `term_doc_counts` is its vector dimension.
/// Built once per vectorization; never updated incrementally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    /// number of documents added, empty ones included
    doc_num: u64,
    /// term -> number of documents containing it
    #[serde(with = "indexmap::map::serde_seq")]
    term_doc_counts: IndexMap<Box<str>, u64>,
}

impl Corpus {
    pub fn new() -> Self {
        Self {
            doc_num: 0,
            term_doc_counts: IndexMap::new(),
        }
    }

    /// Add a document's distinct terms
    pub fn add_doc(&mut self, freq: &TermFrequency) {
        self.doc_num += 1;
        for term in freq.term_set_ref_str() {
            *self.term_doc_counts.entry(term.into()).or_insert(0) += 1;
        }
    }

    #[inline]
    pub fn doc_num(&self) -> u64 {
        self.doc_num
    }

    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.term_doc_counts.len()
    }

    /// vector dimension of `term`
    #[inline]
    pub fn dim_of(&self, term: &str) -> Option<usize> {
        self.term_doc_counts.get_index_of(term)
    }

    #[inline]
    pub fn doc_freq(&self, term: &str) -> u64 {
        self.term_doc_counts.get(term).copied().unwrap_or(0)
    }

    /// document frequencies in dimension order
    pub fn doc_freqs(&self) -> impl Iterator<Item = u64> + '_ {
        self.term_doc_counts.values().copied()
    }

    pub fn term_at(&self, dim: usize) -> Option<&str> {
        self.term_doc_counts.get_index(dim).map(|(t, _)| t.as_ref())
    }
}
