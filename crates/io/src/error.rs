//! Error types for tally-io

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("unknown discrepancy kind '{0}' in store")]
    UnknownKind(String),

    #[error("bad timestamp '{0}' in store")]
    Timestamp(String),

    #[error("bad field list: {0}")]
    Fields(#[from] serde_json::Error),

    #[error("store schema version {found} is newer than supported version {supported}")]
    SchemaVersion { found: u32, supported: u32 },
}
