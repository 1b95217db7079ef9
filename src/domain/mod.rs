//! Core domain types and logic.

pub mod aggregator;
pub mod book;
pub mod config_validation;
pub mod currency;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod tax;
pub mod trade;
