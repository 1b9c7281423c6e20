//! Splitting raw names into normalized word tokens.

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Turns a raw name into an ordered list of normalized tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn tokenize(&self, text: &str) -> Vec<String> {
        self(text)
    }
}

/// NFKC-normalized, lowercased UAX #29 words. Punctuation and whitespace are dropped.
///
/// `_` splits words, since it joins tokens in counter keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl WordTokenizer {
    pub fn new() -> Self { Self }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized: String = text.nfkc().map(|c| if c == '_' { ' ' } else { c }).collect();
        normalized.unicode_words().map(|w| w.to_lowercase()).collect()
    }
}
