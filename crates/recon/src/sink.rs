//! Result sink contract: replace-on-write storage for one run's discrepancies.

use crate::evidence::count_by_kind;
use crate::model::{Discrepancy, KindCount};

/// Storage for the latest run. Each write replaces the previous run.
pub trait DiscrepancySink {
    type Error: std::error::Error;

    /// Clear the previous run and store `discrepancies`, all-or-nothing.
    fn replace_all(&mut self, discrepancies: &[Discrepancy]) -> Result<(), Self::Error>;

    /// Remove every stored discrepancy.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Stored counts per kind, most frequent first.
    fn counts_by_kind(&self) -> Result<Vec<KindCount>, Self::Error>;

    /// First `limit` stored discrepancies in insertion order.
    fn first(&self, limit: usize) -> Result<Vec<Discrepancy>, Self::Error>;
}

/// In-process sink for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Vec<Discrepancy>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl DiscrepancySink for MemorySink {
    type Error = std::convert::Infallible;

    fn replace_all(&mut self, discrepancies: &[Discrepancy]) -> Result<(), Self::Error> {
        self.rows = discrepancies.to_vec();
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.rows.clear();
        Ok(())
    }

    fn counts_by_kind(&self) -> Result<Vec<KindCount>, Self::Error> {
        Ok(count_by_kind(&self.rows))
    }

    fn first(&self, limit: usize) -> Result<Vec<Discrepancy>, Self::Error> {
        Ok(self.rows.iter().take(limit).cloned().collect())
    }
}
