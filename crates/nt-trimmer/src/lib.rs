//! Name trimmer. Shortens noisy multi-token names to their most specific
//! core phrase using corpus frequencies.
//!
//! Pieces:
//! - `tokenizer`: raw name to normalized tokens
//! - `filter`: phrases never usable as keys
//! - `trimmer`: greedy edge trimming against a `Counter`
//! - `dedup`: prefix-redundancy filter for key lists

pub mod dedup;
pub mod filter;
pub mod tokenizer;
pub mod trimmer;

pub use dedup::non_redundant;
pub use filter::exclude_ngram;
pub use tokenizer::{Tokenizer, WordTokenizer};
pub use trimmer::Trimmer;

pub use nt_core::{CounterConfig, CounterKind, NtError, Result, TrimmerConfig};
pub use nt_counter::{Counter, ExactCounter, FrequencyCounter, SketchCounter};
