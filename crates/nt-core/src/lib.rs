//! Shared error and configuration types for the name trimmer.

pub mod config;
pub mod error;

pub use config::{CounterConfig, CounterKind, TrimmerConfig};
pub use error::{NtError, Result};
