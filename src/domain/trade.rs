//! Trade records and the single-record parser.

use crate::domain::error::RecordParseError;

pub const FIELD_COUNT: usize = 5;
pub const BUY_INDICATOR: &str = "b";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Anything other than the buy indicator is a sale.
    pub fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case(BUY_INDICATOR) {
            Side::Buy
        } else {
            Side::Sell
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    /// Opaque; never interpreted.
    pub date: String,
    pub symbol: String,
    pub side: Side,
    pub quantity: usize,
    pub price: f64,
    /// Units of this lot available for matching. Always zero for sales.
    pub remaining: usize,
}

impl Trade {
    pub fn new(date: &str, symbol: &str, side: Side, quantity: usize, price: f64) -> Self {
        let remaining = match side {
            Side::Buy => quantity,
            Side::Sell => 0,
        };
        Self {
            date: date.to_string(),
            symbol: symbol.to_string(),
            side,
            quantity,
            price,
            remaining,
        }
    }

    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.side == Side::Sell
    }

    pub fn notional(&self) -> f64 {
        self.price * self.quantity as f64
    }

    /// Key used to group trades into ledgers.
    pub fn normalized_symbol(&self) -> String {
        normalize_symbol(&self.symbol)
    }
}

pub fn normalize_symbol(symbol: &str) -> String {
    symbol.to_uppercase()
}

/// Parse `date,symbol,side,quantity,price`. Fields are taken verbatim.
pub fn parse_trade(record: &str) -> Result<Trade, RecordParseError> {
    let fields: Vec<&str> = record.split(',').collect();
    if fields.len() != FIELD_COUNT {
        return Err(RecordParseError::FieldCount {
            expected: FIELD_COUNT,
            found: fields.len(),
            record: record.to_string(),
        });
    }

    let quantity: usize =
        fields[3]
            .parse()
            .map_err(|e: std::num::ParseIntError| RecordParseError::InvalidQuantity {
                value: fields[3].to_string(),
                reason: e.to_string(),
            })?;

    let price = parse_price(fields[4])?;

    Ok(Trade::new(
        fields[0],
        fields[1],
        Side::from_token(fields[2]),
        quantity,
        price,
    ))
}

fn parse_price(value: &str) -> Result<f64, RecordParseError> {
    let invalid = |reason: String| RecordParseError::InvalidPrice {
        value: value.to_string(),
        reason,
    };
    let price: f64 = value.parse().map_err(|e: std::num::ParseFloatError| invalid(e.to_string()))?;
    if !price.is_finite() {
        return Err(invalid("price must be finite".into()));
    }
    if price < 0.0 {
        return Err(invalid("price must be non-negative".into()));
    }
    Ok(price)
}
