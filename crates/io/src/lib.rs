//! File and database I/O around the reconciliation engine.

pub mod error;
pub mod store;
pub mod text;

pub use error::{Error, Result};
pub use store::SqliteStore;

/// Result table schema version.
/// Increment when the `discrepancies` table changes incompatibly.
pub const STORE_SCHEMA_VERSION: u32 = 1;
