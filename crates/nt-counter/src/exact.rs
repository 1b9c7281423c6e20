//! Exact hash-map counter with a line-oriented text snapshot.
//!
//! Snapshot lines are `<count> <key>\n`. Keys are written verbatim, so a key
//! containing whitespace cannot be read back.

use crate::traits::Counter;
use nt_core::{NtError, Result};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExactCounter {
    counts: HashMap<Vec<u8>, u64>,
}

impl ExactCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], u64)> {
        self.counts.iter().map(|(k, &v)| (k.as_slice(), v))
    }

    /// Set a key's count directly, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, count: u64) {
        self.counts.insert(key.into(), count);
    }
}

impl<K: Into<Vec<u8>>> FromIterator<(K, u64)> for ExactCounter {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        Self { counts: iter.into_iter().map(|(k, v)| (k.into(), v)).collect() }
    }
}

fn parse_line(line: &[u8]) -> std::result::Result<(&[u8], u64), String> {
    let fields: Vec<&[u8]> = line
        .split(|b| b.is_ascii_whitespace())
        .filter(|f| !f.is_empty())
        .collect();
    if fields.len() != 2 {
        return Err(format!("expected a count and a key, got {} fields", fields.len()));
    }
    let count = std::str::from_utf8(fields[0])
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| format!("invalid count {:?}", String::from_utf8_lossy(fields[0])))?;
    Ok((fields[1], count))
}

impl Counter for ExactCounter {
    fn add(&mut self, key: &[u8]) {
        match self.counts.get_mut(key) {
            Some(n) => *n = n.saturating_add(1),
            None => {
                self.counts.insert(key.to_vec(), 1);
            }
        }
    }

    fn count(&self, key: &[u8]) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    fn export(&self, writer: &mut dyn Write) -> Result<usize> {
        let mut entries: Vec<_> = self.counts.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let mut out = BufWriter::new(writer);
        let mut written = 0;
        for (key, count) in entries {
            let prefix = format!("{count} ");
            out.write_all(prefix.as_bytes())?;
            out.write_all(key)?;
            out.write_all(b"\n")?;
            written += prefix.len() + key.len() + 1;
        }
        out.flush()?;
        Ok(written)
    }

    fn import(&mut self, reader: &mut dyn Read) -> Result<usize> {
        let mut reader = BufReader::new(reader);
        let mut line = Vec::new();
        let mut records = 0;
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            let (key, count) = parse_line(&line).map_err(|reason| NtError::SnapshotParse {
                record: records + 1,
                records_read: records,
                reason,
            })?;
            self.counts.insert(key.to_vec(), count);
            records += 1;
        }
        Ok(records)
    }
}
