//! Greedy edge trimming of multi-token names.
//!
//! A name is cut down one edge token at a time, always dropping whichever
//! edge unigram is more common (the tail on ties). Trimming stops as soon as
//! the next shorter phrase would be too frequent or excluded, and the last
//! acceptable phrase is returned. The result is always a contiguous run of
//! the original tokens.

use crate::dedup::non_redundant;
use crate::filter::exclude_ngram;
use crate::tokenizer::{Tokenizer, WordTokenizer};
use nt_core::{Result, TrimmerConfig};
use nt_counter::{load_snapshot, save_snapshot, Counter, FrequencyCounter};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Joins tokens into a counter key.
pub const PHRASE_DELIMITER: &str = "_";
/// Joins tokens in returned phrases.
pub const OUTPUT_DELIMITER: &str = " ";

pub struct Trimmer<C: Counter = FrequencyCounter> {
    counter: C,
    tokenizer: Box<dyn Tokenizer>,
    default_threshold: u8,
    max_freq: u32,
}

fn join<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens.iter().map(|t| t.as_ref()).collect::<Vec<&str>>().join(PHRASE_DELIMITER)
}

impl Trimmer<FrequencyCounter> {
    /// Trimmer with an empty counter. Fill it with `index_names` or `add`.
    pub fn new(config: &TrimmerConfig) -> Result<Self> {
        config.validate()?;
        let counter = FrequencyCounter::from_config(&config.counter)?;
        Ok(Self::with_counter(counter, config.default_threshold, config.max_freq))
    }

    /// Trimmer whose counter is loaded from a snapshot file.
    pub fn from_snapshot(path: impl AsRef<Path>, config: &TrimmerConfig) -> Result<Self> {
        config.validate()?;
        let counter = load_snapshot(path, &config.counter)?;
        Ok(Self::with_counter(counter, config.default_threshold, config.max_freq))
    }
}

impl<C: Counter> Trimmer<C> {
    pub fn with_counter(counter: C, default_threshold: u8, max_freq: u32) -> Self {
        Self {
            counter,
            tokenizer: Box::new(WordTokenizer),
            default_threshold,
            max_freq,
        }
    }

    /// Replace the default `WordTokenizer`.
    pub fn with_tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    pub fn default_threshold(&self) -> u8 { self.default_threshold }
    pub fn max_freq(&self) -> u32 { self.max_freq }
    pub fn counter(&self) -> &C { &self.counter }
    pub fn counter_mut(&mut self) -> &mut C { &mut self.counter }
    pub fn into_counter(self) -> C { self.counter }

    pub fn add(&mut self, key: &[u8]) {
        self.counter.add(key);
    }

    pub fn count(&self, key: &[u8]) -> u64 {
        self.counter.count(key)
    }

    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<usize> {
        save_snapshot(path, &self.counter)
    }

    /// Count every distinct contiguous n-gram of `name` once. Returns how many were added.
    pub fn index_name(&mut self, name: &str) -> usize {
        let tokens = self.tokenizer.tokenize(name);
        let mut seen = HashSet::new();
        for n in 1..=tokens.len() {
            for window in tokens.windows(n) {
                let key = join(window);
                if !seen.contains(&key) {
                    self.counter.add(key.as_bytes());
                    seen.insert(key);
                }
            }
        }
        seen.len()
    }

    /// Index a corpus of names. Returns the number of n-grams added.
    pub fn index_names<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut docs = 0usize;
        let mut ngrams = 0usize;
        for name in names {
            ngrams += self.index_name(name.as_ref());
            docs += 1;
        }
        info!(docs, ngrams, "indexed names");
        ngrams
    }

    /// Trim `name` against the configured default threshold.
    pub fn trim(&self, name: &str) -> Option<String> {
        self.trim_with_threshold(name, u64::from(self.default_threshold))
    }

    /// Trim `name`, accepting shorter phrases seen at most `threshold` times.
    ///
    /// `None` means the name had no tokens or was excluded before any trimming.
    pub fn trim_with_threshold(&self, name: &str, threshold: u64) -> Option<String> {
        let tokens = self.tokenizer.tokenize(name);
        self.trim_tokens(&tokens, threshold)
    }

    /// Trim an already tokenized name.
    pub fn trim_tokens<S: AsRef<str>>(&self, tokens: &[S], threshold: u64) -> Option<String> {
        match tokens {
            [] => return None,
            [only] => return Some(only.as_ref().to_string()),
            _ => {}
        }

        let mut window = tokens;
        let mut phrase = join(window);
        let df = self.doc_freq(&phrase);
        if exclude_ngram(&phrase, df, self.max_freq) {
            debug!(phrase = %phrase, df, "untrimmed phrase excluded");
            return None;
        }

        while let Some(shorter) = self.drop_edge(window) {
            let candidate = join(shorter);
            let df = self.doc_freq(&candidate);
            if df > threshold || exclude_ngram(&candidate, df, self.max_freq) {
                debug!(phrase = %phrase, rejected = %candidate, df, threshold, "trim stopped");
                break;
            }
            debug!(from = %phrase, to = %candidate, df, "trimmed");
            window = shorter;
            phrase = candidate;
        }

        Some(phrase.replace(PHRASE_DELIMITER, OUTPUT_DELIMITER))
    }

    /// Trim every name and reduce the successes to a sorted, prefix-free key list.
    pub fn search_keys<I, S>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keys: Vec<String> = names
            .into_iter()
            .filter_map(|name| self.trim(name.as_ref()))
            .collect();
        keys.sort_unstable();
        non_redundant(&keys)
    }

    // Unseen phrases count as one occurrence.
    fn doc_freq(&self, phrase: &str) -> u64 {
        self.counter.count(phrase.as_bytes()).max(1)
    }

    fn drop_edge<'a, S: AsRef<str>>(&self, window: &'a [S]) -> Option<&'a [S]> {
        if window.len() < 2 {
            return None;
        }
        let (head, rest) = window.split_first()?;
        let (tail, init) = window.split_last()?;
        let head_df = self.counter.count(head.as_ref().as_bytes());
        let tail_df = self.counter.count(tail.as_ref().as_bytes());
        if head_df > tail_df {
            Some(rest)
        } else {
            Some(init)
        }
    }
}
