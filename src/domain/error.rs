//! Domain error types.

use crate::domain::aggregator::AggregateError;

/// A malformed trade record. Always recoverable: the record is skipped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordParseError {
    #[error("expected {expected} fields, found {found} in record {record:?}")]
    FieldCount {
        expected: usize,
        found: usize,
        record: String,
    },

    #[error("invalid quantity {value:?}: {reason}")]
    InvalidQuantity { value: String, reason: String },

    #[error("invalid price {value:?}: {reason}")]
    InvalidPrice { value: String, reason: String },
}

impl RecordParseError {
    /// Name of the field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            RecordParseError::FieldCount { .. } => "record",
            RecordParseError::InvalidQuantity { .. } => "quantity",
            RecordParseError::InvalidPrice { .. } => "price",
        }
    }
}

/// Top-level error type for capgains.
#[derive(Debug, thiserror::Error)]
pub enum CapgainsError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to read ledger {source_name}: {reason}")]
    LedgerRead { source_name: String, reason: String },

    #[error("{rejected} of {total} records rejected")]
    RecordsRejected { rejected: usize, total: usize },

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&CapgainsError> for std::process::ExitCode {
    fn from(err: &CapgainsError) -> Self {
        let code: u8 = match err {
            CapgainsError::Io(_) | CapgainsError::LedgerRead { .. } => 1,
            CapgainsError::ConfigParse { .. } | CapgainsError::ConfigInvalid { .. } => 2,
            CapgainsError::Aggregate(_) => 3,
            CapgainsError::RecordsRejected { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
