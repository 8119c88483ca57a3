use crate::model::Side;

#[derive(Debug, thiserror::Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty compare list, blank key field, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// The same key appears twice within one collection.
    #[error("{side} collection: duplicate key {id}")]
    DuplicateKey { side: Side, id: i64 },
    /// A key cell could not be coerced to an integer.
    #[error("{side} collection, line {line}: key '{value}' is not an integer")]
    InvalidKey { side: Side, line: u64, value: String },
    /// Inclusive range with lower bound above upper bound.
    #[error("invalid key range: lower {lower} > upper {upper}")]
    InvalidRange { lower: i64, upper: i64 },
    /// Missing required column in input data.
    #[error("{side} collection: missing column '{column}'")]
    MissingColumn { side: Side, column: String },
    /// Delimited text could not be read.
    #[error("{side} collection: {message}")]
    Csv { side: Side, message: String },
}

impl ReconError {
    /// Malformed input data, as opposed to a bad config or unreadable file.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::DuplicateKey { .. } | Self::InvalidKey { .. } | Self::InvalidRange { .. }
        )
    }
}
