use serde::Serialize;

use crate::error::ReconError;

/// Inclusive `[lower, upper]` filter on record ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyRange {
    lower: i64,
    upper: i64,
}

impl KeyRange {
    pub fn new(lower: i64, upper: i64) -> Result<Self, ReconError> {
        if lower > upper {
            return Err(ReconError::InvalidRange { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    /// Range covering every id.
    pub fn full() -> Self {
        Self {
            lower: i64::MIN,
            upper: i64::MAX,
        }
    }

    pub fn lower(&self) -> i64 {
        self.lower
    }

    pub fn upper(&self) -> i64 {
        self.upper
    }

    pub fn contains(&self, id: i64) -> bool {
        self.lower <= id && id <= self.upper
    }
}

impl std::fmt::Display for KeyRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}
