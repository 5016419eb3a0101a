use crate::{config::ContentConfig, vectorizer::stopwords::StopWords};

/// Splits tag text into lowercase word tokens.
///
/// A token is a maximal run of alphanumeric chars or `_`; tokens shorter
/// than `min_token_len` chars and stop words are dropped.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    min_token_len: usize,
    stop_words: Option<StopWords>,
}

impl Tokenizer {
    pub fn new(min_token_len: usize, stop_words: Option<StopWords>) -> Self {
        Self {
            min_token_len: min_token_len.max(1),
            stop_words,
        }
    }

    pub fn from_config(config: &ContentConfig) -> Self {
        let stop_words = config.remove_stop_words.then(StopWords::english);
        Self::new(config.min_token_len, stop_words)
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        lower
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|tok| tok.chars().count() >= self.min_token_len)
            .filter(|tok| !self.is_stop_word(tok))
            .map(str::to_string)
            .collect()
    }

    #[inline]
    fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.as_ref().is_some_and(|sw| sw.contains(token))
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::from_config(&ContentConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_splits_on_punctuation() {
        let tok = Tokenizer::new(2, None);
        assert_eq!(tok.tokenize("Face-Cream, SPF50 (50ml)"), vec!["face", "cream", "spf50", "50ml"]);
    }

    #[test]
    fn drops_short_tokens_and_stop_words() {
        let tok = Tokenizer::default();
        assert_eq!(tok.tokenize("a cream for the face & x body"), vec!["cream", "face", "body"]);
    }

    #[test]
    fn empty_text_has_no_tokens() {
        assert!(Tokenizer::default().tokenize("").is_empty());
        assert!(Tokenizer::default().tokenize("  ,, ").is_empty());
    }
}
