//! CSV report adapter.

use std::io::Write;

use crate::domain::currency::format_currency;
use crate::domain::error::CapgainsError;
use crate::domain::tax::TaxSummary;
use crate::ports::report_port::ReportPort;

const HEADER: [&str; 7] = [
    "symbol", "trades", "proceeds", "basis", "profit", "tax", "unmatched",
];

pub struct CsvReportAdapter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvReportAdapter<W> {
    pub fn new(out: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(out),
        }
    }

    pub fn into_inner(self) -> Result<W, CapgainsError> {
        self.writer
            .into_inner()
            .map_err(|e| CapgainsError::Io(e.into_error()))
    }
}

fn csv_error(e: csv::Error) -> CapgainsError {
    CapgainsError::Io(std::io::Error::other(e))
}

impl<W: Write> ReportPort for CsvReportAdapter<W> {
    fn write_total(&mut self, total_tax: f64, currency_symbol: &str) -> Result<(), CapgainsError> {
        self.writer
            .write_record(["total_tax"])
            .map_err(csv_error)?;
        self.writer
            .write_record([format_currency(total_tax, currency_symbol)])
            .map_err(csv_error)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Amounts are written as plain numbers so the file stays machine-readable.
    fn write_breakdown(
        &mut self,
        summary: &TaxSummary,
        _currency_symbol: &str,
    ) -> Result<(), CapgainsError> {
        self.writer.write_record(HEADER).map_err(csv_error)?;
        for sec in &summary.securities {
            self.writer
                .write_record([
                    sec.symbol.clone(),
                    sec.trade_count.to_string(),
                    format!("{:.2}", sec.proceeds),
                    format!("{:.2}", sec.basis),
                    format!("{:.2}", sec.profit),
                    format!("{:.2}", sec.tax),
                    sec.unmatched().to_string(),
                ])
                .map_err(csv_error)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
