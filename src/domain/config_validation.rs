//! Configuration validation.
//!
//! Validates the `[tax]` and `[aggregator]` sections before a run. Every key
//! is optional; only values that are present get checked.

use crate::domain::aggregator::JoinStrategy;
use crate::domain::error::CapgainsError;
use crate::ports::config_port::ConfigPort;

pub fn validate_tax_config(config: &dyn ConfigPort) -> Result<(), CapgainsError> {
    validate_rate(config)?;
    validate_currency_symbol(config)?;
    Ok(())
}

pub fn validate_aggregator_config(config: &dyn ConfigPort) -> Result<(), CapgainsError> {
    validate_strategy(config)?;
    validate_poll_interval(config)?;
    validate_timeout(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> CapgainsError {
    CapgainsError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_rate(config: &dyn ConfigPort) -> Result<(), CapgainsError> {
    let Some(raw) = config.get_string("tax", "rate") else {
        return Ok(());
    };
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("tax", "rate", format!("{raw:?} is not a number")))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid("tax", "rate", "rate must be between 0 and 1"));
    }
    Ok(())
}

fn validate_currency_symbol(config: &dyn ConfigPort) -> Result<(), CapgainsError> {
    match config.get_string("tax", "currency_symbol") {
        Some(s) if s.trim().is_empty() => Err(invalid(
            "tax",
            "currency_symbol",
            "currency_symbol must not be empty",
        )),
        _ => Ok(()),
    }
}

fn validate_strategy(config: &dyn ConfigPort) -> Result<(), CapgainsError> {
    match config.get_string("aggregator", "strategy") {
        Some(s) => s
            .parse::<JoinStrategy>()
            .map(|_| ())
            .map_err(|reason| invalid("aggregator", "strategy", reason)),
        None => Ok(()),
    }
}

fn validate_poll_interval(config: &dyn ConfigPort) -> Result<(), CapgainsError> {
    if config.get_string("aggregator", "poll_interval_ms").is_none() {
        return Ok(());
    }
    let value = config.get_int("aggregator", "poll_interval_ms", 0);
    if value < 1 {
        return Err(invalid(
            "aggregator",
            "poll_interval_ms",
            "poll_interval_ms must be a positive integer",
        ));
    }
    Ok(())
}

fn validate_timeout(config: &dyn ConfigPort) -> Result<(), CapgainsError> {
    if config.get_string("aggregator", "timeout_ms").is_none() {
        return Ok(());
    }
    let value = config.get_int("aggregator", "timeout_ms", -1);
    if value < 0 {
        return Err(invalid(
            "aggregator",
            "timeout_ms",
            "timeout_ms must be a non-negative integer",
        ));
    }
    Ok(())
}
