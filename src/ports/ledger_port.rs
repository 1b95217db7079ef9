//! Trade ledger input port trait.

use crate::domain::error::CapgainsError;

/// Supplies raw trade records, one per line, in ledger order.
pub trait LedgerPort {
    /// Human-readable origin of the records, used in diagnostics.
    fn source_name(&self) -> String;

    fn read_records(&self) -> Result<Vec<String>, CapgainsError>;
}
