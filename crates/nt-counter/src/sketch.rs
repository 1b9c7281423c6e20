//! Count-min sketch counter.
//!
//! A `depth × width` table of counters. Each key increments one cell per row;
//! its estimate is the smallest of those cells, so an estimate is never below
//! the true count and exceeds it by at most `epsilon * total` with probability
//! `confidence`.
//!
//! Snapshot layout, little-endian:
//!
//! ```text
//! magic "NTCMS" | version u8 | epsilon f64 | confidence f64
//! width u64 | depth u64 | seed u64 | total u64 | width*depth u64 cells
//! ```

use crate::traits::Counter;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use nt_core::config::{CounterConfig, DEFAULT_SEED};
use nt_core::{NtError, Result};
use std::io::{self, BufReader, BufWriter, Read, Write};
use xxhash_rust::xxh3::xxh3_64_with_seed;

const MAGIC: &[u8; 5] = b"NTCMS";
const VERSION: u8 = 1;
const HEADER_LEN: usize = MAGIC.len() + 1 + 6 * 8;
const MAX_PREALLOC_CELLS: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq)]
pub struct SketchCounter {
    epsilon: f64,
    confidence: f64,
    width: usize,
    depth: usize,
    seed: u64,
    total: u64,
    cells: Vec<u64>,
}

/// Table dimensions `(width, depth)` for an error bound and confidence.
pub fn dimensions(epsilon: f64, confidence: f64) -> (usize, usize) {
    let width = (std::f64::consts::E / epsilon).ceil() as usize;
    let depth = (1.0 / (1.0 - confidence)).ln().ceil() as usize;
    (width.max(1), depth.max(1))
}

impl SketchCounter {
    pub fn new(epsilon: f64, confidence: f64) -> Result<Self> {
        Self::with_seed(epsilon, confidence, DEFAULT_SEED)
    }

    pub fn with_seed(epsilon: f64, confidence: f64, seed: u64) -> Result<Self> {
        CounterConfig::sketch(epsilon, confidence).validate()?;
        let (width, depth) = dimensions(epsilon, confidence);
        let n_cells = width.checked_mul(depth).ok_or_else(|| {
            NtError::InvalidConfig(format!("sketch of {width}x{depth} cells is too large"))
        })?;
        Ok(Self {
            epsilon,
            confidence,
            width,
            depth,
            seed,
            total: 0,
            cells: vec![0; n_cells],
        })
    }

    pub fn from_config(config: &CounterConfig) -> Result<Self> {
        Self::with_seed(config.epsilon, config.confidence, config.seed)
    }

    pub fn width(&self) -> usize { self.width }
    pub fn depth(&self) -> usize { self.depth }
    pub fn seed(&self) -> u64 { self.seed }
    pub fn epsilon(&self) -> f64 { self.epsilon }
    pub fn confidence(&self) -> f64 { self.confidence }

    /// Total number of `add` calls recorded.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Upper bound on overcount that holds with probability `confidence`.
    pub fn error_bound(&self) -> f64 {
        self.epsilon * self.total as f64
    }

    /// Decode a sketch written by `export`. Returns the sketch and the number of cells read.
    pub fn read_from(reader: &mut dyn Read) -> Result<(Self, usize)> {
        let mut r = BufReader::new(reader);
        let header_err = |e: io::Error| decode_error(0, 0, e);

        let mut magic = [0u8; 5];
        r.read_exact(&mut magic).map_err(header_err)?;
        if &magic != MAGIC {
            return Err(parse_error(0, 0, "not a sketch snapshot (bad magic)"));
        }
        let version = r.read_u8().map_err(header_err)?;
        if version != VERSION {
            return Err(parse_error(0, 0, format!("unsupported sketch version {version}")));
        }
        let epsilon = r.read_f64::<LittleEndian>().map_err(header_err)?;
        let confidence = r.read_f64::<LittleEndian>().map_err(header_err)?;
        if !(epsilon > 0.0 && epsilon < 1.0) || !(confidence > 0.0 && confidence < 1.0) {
            return Err(parse_error(
                0,
                0,
                format!("invalid sketch parameters epsilon={epsilon} confidence={confidence}"),
            ));
        }
        let width = r.read_u64::<LittleEndian>().map_err(header_err)?;
        let depth = r.read_u64::<LittleEndian>().map_err(header_err)?;
        let seed = r.read_u64::<LittleEndian>().map_err(header_err)?;
        let total = r.read_u64::<LittleEndian>().map_err(header_err)?;

        let n_cells = usize::try_from(width)
            .ok()
            .zip(usize::try_from(depth).ok())
            .filter(|&(w, d)| w > 0 && d > 0)
            .and_then(|(w, d)| w.checked_mul(d).map(|n| (w, d, n)));
        let Some((width, depth, n_cells)) = n_cells else {
            return Err(parse_error(0, 0, format!("invalid sketch dimensions {width}x{depth}")));
        };

        let mut cells = Vec::with_capacity(n_cells.min(MAX_PREALLOC_CELLS));
        for i in 0..n_cells {
            let cell = r.read_u64::<LittleEndian>().map_err(|e| decode_error(i + 1, i, e))?;
            cells.push(cell);
        }

        let sketch = Self { epsilon, confidence, width, depth, seed, total, cells };
        Ok((sketch, n_cells))
    }
}

// Double hashing: row i probes h1 + i*h2, where h1/h2 are the halves of one xxh3 hash.
fn probe(key: &[u8], seed: u64, width: usize, depth: usize) -> impl Iterator<Item = usize> {
    let hash = xxh3_64_with_seed(key, seed);
    let h1 = hash & 0xffff_ffff;
    let h2 = hash >> 32;
    (0..depth).map(move |row| {
        let col = h1.wrapping_add((row as u64).wrapping_mul(h2)) % width as u64;
        row * width + col as usize
    })
}

fn parse_error(record: usize, records_read: usize, reason: impl Into<String>) -> NtError {
    NtError::SnapshotParse { record, records_read, reason: reason.into() }
}

fn decode_error(record: usize, records_read: usize, err: io::Error) -> NtError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        parse_error(record, records_read, "truncated sketch snapshot")
    } else {
        NtError::Io(err)
    }
}

impl Counter for SketchCounter {
    fn add(&mut self, key: &[u8]) {
        for i in probe(key, self.seed, self.width, self.depth) {
            self.cells[i] = self.cells[i].saturating_add(1);
        }
        self.total = self.total.saturating_add(1);
    }

    fn count(&self, key: &[u8]) -> u64 {
        probe(key, self.seed, self.width, self.depth).map(|i| self.cells[i]).min().unwrap_or(0)
    }

    fn export(&self, writer: &mut dyn Write) -> Result<usize> {
        let mut w = BufWriter::new(writer);
        w.write_all(MAGIC)?;
        w.write_u8(VERSION)?;
        w.write_f64::<LittleEndian>(self.epsilon)?;
        w.write_f64::<LittleEndian>(self.confidence)?;
        w.write_u64::<LittleEndian>(self.width as u64)?;
        w.write_u64::<LittleEndian>(self.depth as u64)?;
        w.write_u64::<LittleEndian>(self.seed)?;
        w.write_u64::<LittleEndian>(self.total)?;
        for &cell in &self.cells {
            w.write_u64::<LittleEndian>(cell)?;
        }
        w.flush()?;
        Ok(HEADER_LEN + self.cells.len() * 8)
    }

    /// Replaces the whole sketch. On error the current state is kept.
    fn import(&mut self, reader: &mut dyn Read) -> Result<usize> {
        let (sketch, cells) = Self::read_from(reader)?;
        *self = sketch;
        Ok(cells)
    }
}
