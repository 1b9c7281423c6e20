//! Reading and writing counter snapshot files.

use crate::exact::ExactCounter;
use crate::frequency::FrequencyCounter;
use crate::sketch::SketchCounter;
use crate::traits::Counter;
use nt_core::{CounterConfig, CounterKind, NtError, Result};
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::Path;
use tracing::info;

/// Open `path` and import it into a new counter of the configured kind.
///
/// Sketch dimensions come from the snapshot header, not from `config`.
pub fn load_snapshot(path: impl AsRef<Path>, config: &CounterConfig) -> Result<FrequencyCounter> {
    let path = path.as_ref();
    info!(path = %path.display(), kind = ?config.kind, "reading counter snapshot");
    let file = File::open(path).map_err(|source| NtError::SnapshotOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    let (counter, records) = match config.kind {
        CounterKind::Exact => {
            let mut exact = ExactCounter::new();
            let records = exact.import(&mut reader)?;
            (FrequencyCounter::Exact(exact), records)
        }
        CounterKind::Sketch => {
            let (sketch, records) = SketchCounter::read_from(&mut reader)?;
            (FrequencyCounter::Sketch(sketch), records)
        }
    };
    info!(path = %path.display(), records, "counter snapshot loaded");
    Ok(counter)
}

/// Export `counter` to `path` through a temp file and rename. Returns bytes written.
pub fn save_snapshot<C: Counter + ?Sized>(path: impl AsRef<Path>, counter: &C) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    let result = (|| -> Result<usize> {
        let mut f = File::create(&tmp_path)?;
        let written = counter.export(&mut f)?;
        f.flush()?;
        f.sync_all()?;
        fs::rename(&tmp_path, path)?;
        Ok(written)
    })();
    match result {
        Ok(written) => {
            info!(path = %path.display(), bytes = written, "counter snapshot written");
            Ok(written)
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}
