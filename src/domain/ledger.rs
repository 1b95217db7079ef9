//! Per-security trade ledger and FIFO lot matching.
//!
//! Matching never mutates the ledger. Lot consumption is worked out on a copy
//! of the remaining quantities and returned as a [`Realization`], so a ledger
//! can be realized any number of times with the same result.

use crate::domain::trade::Trade;

/// One slice of a buy lot consumed by a sale.
#[derive(Debug, Clone, PartialEq)]
pub struct LotMatch {
    /// Index of the buy trade within the ledger.
    pub lot_index: usize,
    pub quantity: usize,
    pub price: f64,
}

impl LotMatch {
    pub fn cost(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// Outcome of matching one sale against the ledger's buy lots.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleMatch {
    /// Index of the sell trade within the ledger.
    pub sale_index: usize,
    pub proceeds: f64,
    pub basis: f64,
    pub matches: Vec<LotMatch>,
    /// Units sold with no lot left to match; they carry zero basis.
    pub unmatched: usize,
}

impl SaleMatch {
    pub fn profit(&self) -> f64 {
        self.proceeds - self.basis
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Realization {
    pub sales: Vec<SaleMatch>,
    /// Remaining units per trade after every sale was matched. Zero for sales.
    pub remaining: Vec<usize>,
}

impl Realization {
    pub fn proceeds(&self) -> f64 {
        self.sales.iter().map(|s| s.proceeds).sum()
    }

    pub fn basis(&self) -> f64 {
        self.sales.iter().map(|s| s.basis).sum()
    }

    pub fn profit(&self) -> f64 {
        self.sales.iter().map(SaleMatch::profit).sum()
    }

    pub fn unmatched(&self) -> usize {
        self.sales.iter().map(|s| s.unmatched).sum()
    }
}

/// Tax owed on a realized profit. Losses owe nothing and do not carry forward.
pub fn tax_on_profit(profit: f64, rate: f64) -> f64 {
    if profit > 0.0 { profit * rate } else { 0.0 }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SecurityLedger {
    pub symbol: String,
    trades: Vec<Trade>,
}

impl SecurityLedger {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            trades: Vec::new(),
        }
    }

    pub fn push(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Match every sale, in record order, against buy lots in record order.
    ///
    /// The lot scan restarts from the first trade for each sale and runs over
    /// the whole ledger, so a sale may be covered by a buy recorded after it.
    pub fn realize(&self) -> Realization {
        let mut remaining: Vec<usize> = self.trades.iter().map(|t| t.remaining).collect();
        let mut sales = Vec::new();

        for (sale_index, sale) in self.trades.iter().enumerate() {
            if !sale.is_sell() {
                continue;
            }

            let mut need = sale.quantity;
            let mut basis = 0.0;
            let mut matches = Vec::new();

            for (lot_index, lot) in self.trades.iter().enumerate() {
                if need == 0 {
                    break;
                }
                if !lot.is_buy() || remaining[lot_index] == 0 {
                    continue;
                }

                let take = need.min(remaining[lot_index]);
                remaining[lot_index] -= take;
                need -= take;

                let slice = LotMatch {
                    lot_index,
                    quantity: take,
                    price: lot.price,
                };
                basis += slice.cost();
                matches.push(slice);
            }

            sales.push(SaleMatch {
                sale_index,
                proceeds: sale.notional(),
                basis,
                matches,
                unmatched: need,
            });
        }

        Realization { sales, remaining }
    }

    pub fn profit(&self) -> f64 {
        self.realize().profit()
    }

    pub fn tax(&self, rate: f64) -> f64 {
        tax_on_profit(self.profit(), rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::Side;
    use approx::assert_abs_diff_eq;

    const RATE: f64 = 0.25;

    fn ledger(trades: &[(Side, usize, f64)]) -> SecurityLedger {
        let mut ledger = SecurityLedger::new("IBM");
        for (i, &(side, qty, price)) in trades.iter().enumerate() {
            ledger.push(Trade::new(&format!("d{i}"), "IBM", side, qty, price));
        }
        ledger
    }

    #[test]
    fn simple_fifo() {
        let l = ledger(&[(Side::Buy, 10, 1.0), (Side::Sell, 10, 5.0)]);
        assert_abs_diff_eq!(l.profit(), 40.0);
        assert_abs_diff_eq!(l.tax(RATE), 10.0);
    }

    #[test]
    fn short_sale_matches_later_buy() {
        let l = ledger(&[(Side::Sell, 5, 10.0), (Side::Buy, 5, 2.0)]);
        let r = l.realize();
        assert_eq!(r.sales.len(), 1);
        assert_eq!(r.sales[0].matches[0].lot_index, 1);
        assert_abs_diff_eq!(r.profit(), 40.0);
        assert_abs_diff_eq!(l.tax(RATE), 10.0);
    }

    #[test]
    fn partial_lot_consumption() {
        let l = ledger(&[
            (Side::Buy, 10, 1.0),
            (Side::Sell, 4, 5.0),
            (Side::Sell, 6, 5.0),
        ]);
        let r = l.realize();
        assert_abs_diff_eq!(r.sales[0].basis, 4.0);
        assert_abs_diff_eq!(r.sales[1].basis, 6.0);
        assert_abs_diff_eq!(r.profit(), 40.0);
        assert_eq!(r.remaining, vec![0, 0, 0]);
        assert_abs_diff_eq!(l.tax(RATE), 10.0);
    }

    #[test]
    fn loss_owes_nothing() {
        let l = ledger(&[(Side::Buy, 10, 5.0), (Side::Sell, 10, 1.0)]);
        assert_abs_diff_eq!(l.profit(), -40.0);
        assert_eq!(l.tax(RATE), 0.0);
    }

    #[test]
    fn sale_spans_multiple_lots_in_order() {
        let l = ledger(&[
            (Side::Buy, 3, 1.0),
            (Side::Buy, 3, 2.0),
            (Side::Buy, 3, 4.0),
            (Side::Sell, 7, 10.0),
        ]);
        let r = l.realize();
        let sale = &r.sales[0];
        let taken: Vec<(usize, usize)> = sale.matches.iter().map(|m| (m.lot_index, m.quantity)).collect();
        assert_eq!(taken, vec![(0, 3), (1, 3), (2, 1)]);
        assert_abs_diff_eq!(sale.basis, 3.0 + 6.0 + 4.0);
        assert_eq!(r.remaining, vec![0, 0, 2, 0]);
    }

    #[test]
    fn earlier_lots_are_preferred_over_later_ones() {
        let l = ledger(&[
            (Side::Buy, 5, 1.0),
            (Side::Sell, 2, 3.0),
            (Side::Buy, 5, 100.0),
            (Side::Sell, 4, 3.0),
        ]);
        let r = l.realize();
        // second sale takes the 3 left in lot 0, then 1 from lot 2
        assert_abs_diff_eq!(r.sales[1].basis, 3.0 + 100.0);
        assert_eq!(r.remaining, vec![0, 0, 4, 0]);
    }

    #[test]
    fn unmatched_remainder_has_zero_basis() {
        let l = ledger(&[(Side::Buy, 2, 1.0), (Side::Sell, 5, 4.0)]);
        let r = l.realize();
        assert_eq!(r.sales[0].unmatched, 3);
        assert_abs_diff_eq!(r.sales[0].basis, 2.0);
        assert_abs_diff_eq!(r.profit(), 18.0);
        assert_eq!(r.unmatched(), 3);
    }

    #[test]
    fn sale_without_any_buys() {
        let l = ledger(&[(Side::Sell, 4, 2.5)]);
        let r = l.realize();
        assert!(r.sales[0].matches.is_empty());
        assert_abs_diff_eq!(r.profit(), 10.0);
    }

    #[test]
    fn buys_only_realize_nothing() {
        let l = ledger(&[(Side::Buy, 4, 2.5), (Side::Buy, 1, 3.0)]);
        let r = l.realize();
        assert!(r.sales.is_empty());
        assert_eq!(r.profit(), 0.0);
        assert_eq!(r.remaining, vec![4, 1]);
    }

    #[test]
    fn zero_quantity_sale_contributes_nothing() {
        let l = ledger(&[(Side::Buy, 4, 2.5), (Side::Sell, 0, 9.0)]);
        let r = l.realize();
        assert!(r.sales[0].matches.is_empty());
        assert_eq!(r.profit(), 0.0);
        assert_eq!(r.remaining, vec![4, 0]);
    }

    #[test]
    fn realize_leaves_ledger_untouched() {
        let l = ledger(&[(Side::Buy, 10, 1.0), (Side::Sell, 10, 5.0)]);
        let before = l.clone();
        let first = l.realize();
        let second = l.realize();
        assert_eq!(l, before);
        assert_eq!(first, second);
        assert_eq!(l.trades()[0].remaining, 10);
    }

    #[test]
    fn empty_ledger() {
        let l = SecurityLedger::new("IBM");
        assert!(l.is_empty());
        assert_eq!(l.trade_count(), 0);
        assert_eq!(l.tax(RATE), 0.0);
    }

    #[test]
    fn tax_on_profit_respects_rate() {
        assert_abs_diff_eq!(tax_on_profit(100.0, 0.3), 30.0);
        assert_eq!(tax_on_profit(0.0, 0.3), 0.0);
        assert_eq!(tax_on_profit(-5.0, 0.3), 0.0);
    }
}
