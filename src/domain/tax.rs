//! Per-security tax results and their reduction into a single liability.

use crate::domain::book::LedgerBook;
use crate::domain::ledger::{Realization, SecurityLedger, tax_on_profit};

pub const DEFAULT_TAX_RATE: f64 = 0.25;

#[derive(Debug, Clone, PartialEq)]
pub struct SecurityTax {
    pub symbol: String,
    pub trade_count: usize,
    pub proceeds: f64,
    pub basis: f64,
    pub profit: f64,
    pub tax: f64,
    pub realization: Realization,
}

impl SecurityTax {
    pub fn compute(ledger: &SecurityLedger, rate: f64) -> Self {
        let realization = ledger.realize();
        let profit = realization.profit();
        Self {
            symbol: ledger.symbol.clone(),
            trade_count: ledger.trade_count(),
            proceeds: realization.proceeds(),
            basis: realization.basis(),
            profit,
            tax: tax_on_profit(profit, rate),
            realization,
        }
    }

    pub fn unmatched(&self) -> usize {
        self.realization.unmatched()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxSummary {
    /// Sorted by symbol.
    pub securities: Vec<SecurityTax>,
    pub total_tax: f64,
}

impl TaxSummary {
    /// Sum partial results in symbol order, so the total does not depend on
    /// the order they were produced in.
    pub fn from_partials(mut securities: Vec<SecurityTax>) -> Self {
        securities.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        let total_tax = securities.iter().map(|s| s.tax).sum();
        Self {
            securities,
            total_tax,
        }
    }

    pub fn total_profit(&self) -> f64 {
        self.securities.iter().map(|s| s.profit).sum()
    }

    pub fn get(&self, symbol: &str) -> Option<&SecurityTax> {
        self.securities.iter().find(|s| s.symbol == symbol)
    }
}

/// Single-threaded reference reduction.
pub fn summarize(book: &LedgerBook, rate: f64) -> TaxSummary {
    TaxSummary::from_partials(
        book.ledgers()
            .map(|ledger| SecurityTax::compute(ledger, rate))
            .collect(),
    )
}
