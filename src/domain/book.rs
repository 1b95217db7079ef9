//! Partitions a raw trade stream into one ledger per security.

use std::collections::BTreeMap;

use tracing::warn;

use crate::domain::error::RecordParseError;
use crate::domain::ledger::SecurityLedger;
use crate::domain::trade::{normalize_symbol, parse_trade};

/// A record that failed to parse and was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    /// 1-based position among the records handed to [`build_book`]. Blank
    /// lines dropped by the reader are not counted, so this is not a file
    /// line number.
    pub record_number: usize,
    pub record: String,
    pub error: RecordParseError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerBook {
    ledgers: BTreeMap<String, SecurityLedger>,
}

impl LedgerBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<&SecurityLedger> {
        self.ledgers.get(&normalize_symbol(symbol))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.ledgers.keys().map(String::as_str)
    }

    pub fn ledgers(&self) -> impl Iterator<Item = &SecurityLedger> {
        self.ledgers.values()
    }

    pub fn security_count(&self) -> usize {
        self.ledgers.len()
    }

    pub fn trade_count(&self) -> usize {
        self.ledgers.values().map(SecurityLedger::trade_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }
}

/// The book plus every record that was skipped while building it.
#[derive(Debug, Clone, Default)]
pub struct BookBuild {
    pub book: LedgerBook,
    pub rejected: Vec<RejectedRecord>,
    pub records_seen: usize,
}

impl BookBuild {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Parse each record and file it under its upper-cased symbol. Malformed
/// records are logged and skipped; they never abort the build.
pub fn build_book<I, S>(records: I) -> BookBuild
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut build = BookBuild::default();

    for (i, record) in records.into_iter().enumerate() {
        let record = record.as_ref();
        build.records_seen += 1;

        let trade = match parse_trade(record) {
            Ok(trade) => trade,
            Err(error) => {
                warn!(record_number = i + 1, field = error.field(), %error, "skipping record");
                build.rejected.push(RejectedRecord {
                    record_number: i + 1,
                    record: record.to_string(),
                    error,
                });
                continue;
            }
        };

        let key = trade.normalized_symbol();
        build
            .book
            .ledgers
            .entry(key)
            .or_insert_with_key(|k| SecurityLedger::new(k.clone()))
            .push(trade);
    }

    build
}
