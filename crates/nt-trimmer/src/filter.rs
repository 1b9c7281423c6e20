//! Phrases that can never stand in as a trimmed name.

use regex::Regex;
use std::sync::LazyLock;

static RE_LETTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-zA-Z]").unwrap());
// Quantity plus a one-letter unit: 5kg is not, 12d / 3m / 40x are.
static RE_MEASURE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+[dwmysxkcbt]$").unwrap());

/// True if `phrase` has no ASCII letter, is a bare measurement like `12m`,
/// or occurs more than `max_freq` times.
pub fn exclude_ngram(phrase: &str, df: u64, max_freq: u32) -> bool {
    !RE_LETTER.is_match(phrase) || RE_MEASURE.is_match(phrase) || df > u64::from(max_freq)
}
