//! Plain-text report adapter.

use std::io::Write;

use crate::domain::currency::format_currency;
use crate::domain::error::CapgainsError;
use crate::domain::tax::{SecurityTax, TaxSummary};
use crate::ports::report_port::ReportPort;

pub struct ConsoleReportAdapter<W: Write> {
    out: W,
    show_lots: bool,
}

impl<W: Write> ConsoleReportAdapter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            show_lots: false,
        }
    }

    pub fn with_lots(mut self, show_lots: bool) -> Self {
        self.show_lots = show_lots;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_security(&mut self, sec: &SecurityTax, symbol: &str) -> Result<(), CapgainsError> {
        writeln!(
            self.out,
            "{:<10} {:>6} {:>14} {:>14} {:>14} {:>14}",
            sec.symbol,
            sec.trade_count,
            format_currency(sec.proceeds, symbol),
            format_currency(sec.basis, symbol),
            format_currency(sec.profit, symbol),
            format_currency(sec.tax, symbol),
        )?;

        if !self.show_lots {
            return Ok(());
        }
        for sale in &sec.realization.sales {
            writeln!(
                self.out,
                "    sale #{}: proceeds {}, basis {}",
                sale.sale_index + 1,
                format_currency(sale.proceeds, symbol),
                format_currency(sale.basis, symbol),
            )?;
            for m in &sale.matches {
                writeln!(
                    self.out,
                    "      lot #{}: {} @ {}",
                    m.lot_index + 1,
                    m.quantity,
                    format_currency(m.price, symbol),
                )?;
            }
            if sale.unmatched > 0 {
                writeln!(self.out, "      unmatched: {} (zero basis)", sale.unmatched)?;
            }
        }
        Ok(())
    }
}

impl<W: Write> ReportPort for ConsoleReportAdapter<W> {
    fn write_total(&mut self, total_tax: f64, currency_symbol: &str) -> Result<(), CapgainsError> {
        writeln!(self.out, "{}", format_currency(total_tax, currency_symbol))?;
        Ok(())
    }

    fn write_breakdown(
        &mut self,
        summary: &TaxSummary,
        currency_symbol: &str,
    ) -> Result<(), CapgainsError> {
        writeln!(
            self.out,
            "{:<10} {:>6} {:>14} {:>14} {:>14} {:>14}",
            "SYMBOL", "TRADES", "PROCEEDS", "BASIS", "PROFIT", "TAX"
        )?;
        for sec in &summary.securities {
            self.write_security(sec, currency_symbol)?;
        }
        writeln!(
            self.out,
            "{:<10} {:>6} {:>14} {:>14} {:>14} {:>14}",
            "TOTAL",
            summary.securities.iter().map(|s| s.trade_count).sum::<usize>(),
            "",
            "",
            format_currency(summary.total_profit(), currency_symbol),
            format_currency(summary.total_tax, currency_symbol),
        )?;
        Ok(())
    }
}
