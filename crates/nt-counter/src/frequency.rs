//! Closed set of counter variants behind the `Counter` trait.

use crate::exact::ExactCounter;
use crate::sketch::SketchCounter;
use crate::traits::Counter;
use nt_core::{CounterConfig, CounterKind, Result};
use std::io::{Read, Write};

#[derive(Debug, Clone, PartialEq)]
pub enum FrequencyCounter {
    /// Exact counts; memory grows with the number of distinct keys.
    Exact(ExactCounter),
    /// Fixed memory; counts may overshoot, never undershoot.
    Sketch(SketchCounter),
}

impl FrequencyCounter {
    pub fn from_config(config: &CounterConfig) -> Result<Self> {
        config.validate()?;
        Ok(match config.kind {
            CounterKind::Exact => Self::Exact(ExactCounter::new()),
            CounterKind::Sketch => Self::Sketch(SketchCounter::from_config(config)?),
        })
    }

    pub fn kind(&self) -> CounterKind {
        match self {
            Self::Exact(_) => CounterKind::Exact,
            Self::Sketch(_) => CounterKind::Sketch,
        }
    }
}

impl From<ExactCounter> for FrequencyCounter {
    fn from(c: ExactCounter) -> Self {
        Self::Exact(c)
    }
}

impl From<SketchCounter> for FrequencyCounter {
    fn from(c: SketchCounter) -> Self {
        Self::Sketch(c)
    }
}

impl Counter for FrequencyCounter {
    fn add(&mut self, key: &[u8]) {
        match self {
            Self::Exact(c) => c.add(key),
            Self::Sketch(c) => c.add(key),
        }
    }

    fn count(&self, key: &[u8]) -> u64 {
        match self {
            Self::Exact(c) => c.count(key),
            Self::Sketch(c) => c.count(key),
        }
    }

    fn export(&self, writer: &mut dyn Write) -> Result<usize> {
        match self {
            Self::Exact(c) => c.export(writer),
            Self::Sketch(c) => c.export(writer),
        }
    }

    fn import(&mut self, reader: &mut dyn Read) -> Result<usize> {
        match self {
            Self::Exact(c) => c.import(reader),
            Self::Sketch(c) => c.import(reader),
        }
    }
}
