//! Result output port trait.

use crate::domain::error::CapgainsError;
use crate::domain::tax::TaxSummary;

/// Port for emitting tax results.
pub trait ReportPort {
    fn write_total(&mut self, total_tax: f64, currency_symbol: &str) -> Result<(), CapgainsError>;

    /// Default implementation: falls back to `write_total`.
    fn write_breakdown(
        &mut self,
        summary: &TaxSummary,
        currency_symbol: &str,
    ) -> Result<(), CapgainsError> {
        self.write_total(summary.total_tax, currency_symbol)
    }
}
