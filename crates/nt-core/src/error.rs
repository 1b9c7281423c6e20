use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NtError {
    #[error("Cannot open snapshot {}: {source}", path.display())]
    SnapshotOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Snapshot parse error at record {record} ({records_read} records read): {reason}")]
    SnapshotParse {
        record: usize,
        records_read: usize,
        reason: String,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NtError {
    /// Records successfully decoded before a parse failure, if this is one.
    pub fn records_read(&self) -> Option<usize> {
        match self {
            Self::SnapshotParse { records_read, .. } => Some(*records_read),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, NtError>;
