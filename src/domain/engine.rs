//! End-to-end tax run: raw records in, formatted liability out.

use crate::domain::aggregator::{AggregateError, AggregatorConfig, TaxAggregator};
use crate::domain::book::{BookBuild, build_book};
use crate::domain::currency::{DEFAULT_CURRENCY_SYMBOL, format_currency};
use crate::domain::tax::TaxSummary;

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub aggregator: AggregatorConfig,
    pub currency_symbol: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            aggregator: AggregatorConfig::default(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaxRun {
    pub build: BookBuild,
    pub summary: TaxSummary,
    pub currency_symbol: String,
}

impl TaxRun {
    pub fn total_tax(&self) -> f64 {
        self.summary.total_tax
    }

    pub fn formatted_total(&self) -> String {
        format_currency(self.summary.total_tax, &self.currency_symbol)
    }
}

pub fn run_tax<I, S>(records: I, config: &RunConfig) -> Result<TaxRun, AggregateError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let build = build_book(records);
    let summary = TaxAggregator::new(config.aggregator.clone()).aggregate(&build.book)?;
    Ok(TaxRun {
        build,
        summary,
        currency_symbol: config.currency_symbol.clone(),
    })
}
