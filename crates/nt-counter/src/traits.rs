use nt_core::Result;
use std::io::{Read, Write};

/// Occurrence counter over byte-string keys.
///
/// Mutation is additive only: a counter is filled by `add` during indexing
/// and then queried read-only. Implementations are not synchronized; share
/// one across threads behind a lock.
pub trait Counter {
    /// Record one occurrence of `key`.
    fn add(&mut self, key: &[u8]);

    /// Best estimate of how often `key` was added. Zero if never seen.
    fn count(&self, key: &[u8]) -> u64;

    /// Serialize the full state. Returns bytes written.
    fn export(&self, writer: &mut dyn Write) -> Result<usize>;

    /// Load state written by the same variant's `export`. Returns records read.
    fn import(&mut self, reader: &mut dyn Read) -> Result<usize>;
}
