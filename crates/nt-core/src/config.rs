//! Trimmer and counter configuration.

use crate::error::{NtError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_THRESHOLD: u8 = 10;
pub const DEFAULT_MAX_FREQ: u32 = 10_000;
pub const DEFAULT_EPSILON: f64 = 1e-5;
pub const DEFAULT_CONFIDENCE: f64 = 0.999;
pub const DEFAULT_SEED: u64 = 0x9e37_79b9_7f4a_7c15;
/// Largest sketch table accepted, in cells (2 GiB of `u64` counters).
pub const MAX_SKETCH_CELLS: usize = 1 << 28;

/// Which counter backs the trimmer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterKind {
    /// Hash map, exact counts, text snapshots.
    Exact,
    /// Count-min sketch, one-sided overcount, binary snapshots.
    #[default]
    Sketch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub kind: CounterKind,
    /// Relative error bound of the sketch (ignored by the exact counter).
    pub epsilon: f64,
    /// Probability that a sketch estimate stays within the error bound.
    pub confidence: f64,
    pub seed: u64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            kind: CounterKind::Sketch,
            epsilon: DEFAULT_EPSILON,
            confidence: DEFAULT_CONFIDENCE,
            seed: DEFAULT_SEED,
        }
    }
}

impl CounterConfig {
    pub fn exact() -> Self {
        Self { kind: CounterKind::Exact, ..Self::default() }
    }

    pub fn sketch(epsilon: f64, confidence: f64) -> Self {
        Self { kind: CounterKind::Sketch, epsilon, confidence, ..Self::default() }
    }

    pub fn validate(&self) -> Result<()> {
        if self.kind == CounterKind::Exact {
            return Ok(());
        }
        if !(self.epsilon > 0.0 && self.epsilon < 1.0) {
            return Err(NtError::InvalidConfig(format!(
                "epsilon must be in (0, 1), got {}",
                self.epsilon
            )));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(NtError::InvalidConfig(format!(
                "confidence must be in (0, 1), got {}",
                self.confidence
            )));
        }
        let width = (std::f64::consts::E / self.epsilon).ceil();
        let depth = (1.0 / (1.0 - self.confidence)).ln().ceil().max(1.0);
        if width * depth > MAX_SKETCH_CELLS as f64 {
            return Err(NtError::InvalidConfig(format!(
                "sketch for epsilon {} and confidence {} needs {width}x{depth} cells, limit is {MAX_SKETCH_CELLS}",
                self.epsilon, self.confidence
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimmerConfig {
    /// Highest document frequency a trimmed phrase may have and still count as specific.
    pub default_threshold: u8,
    /// Phrases seen more often than this are never used as keys.
    pub max_freq: u32,
    pub counter: CounterConfig,
}

impl Default for TrimmerConfig {
    fn default() -> Self {
        Self {
            default_threshold: DEFAULT_THRESHOLD,
            max_freq: DEFAULT_MAX_FREQ,
            counter: CounterConfig::default(),
        }
    }
}

impl TrimmerConfig {
    pub fn new(default_threshold: u8, max_freq: u32) -> Self {
        Self { default_threshold, max_freq, ..Self::default() }
    }

    pub fn with_counter(mut self, counter: CounterConfig) -> Self {
        self.counter = counter;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_freq == 0 {
            return Err(NtError::InvalidConfig("max_freq must be positive".into()));
        }
        self.counter.validate()
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "loaded trimmer config");
        Self::from_json_str(&raw)
    }
}
