//! Concurrent per-security tax computation.
//!
//! One worker thread per security, results funnelled through an mpsc channel.
//! Two join strategies are offered:
//!
//! * [`JoinStrategy::Blocking`]: workers count down a completion latch and the
//!   caller parks on it until every worker is accounted for.
//! * [`JoinStrategy::Polling`]: the caller spins on `try_recv`, sleeping for
//!   `poll_interval` after each empty read. Adds up to one interval of latency
//!   and burns wakeups; kept as a reference baseline for the blocking join.
//!
//! Both produce identical totals since partials are reduced in symbol order.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::domain::book::LedgerBook;
use crate::domain::ledger::SecurityLedger;
use crate::domain::tax::{DEFAULT_TAX_RATE, SecurityTax, TaxSummary};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinStrategy {
    #[default]
    Blocking,
    Polling,
}

impl FromStr for JoinStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blocking" => Ok(JoinStrategy::Blocking),
            "polling" => Ok(JoinStrategy::Polling),
            other => Err(format!(
                "unknown join strategy {other:?} (expected blocking or polling)"
            )),
        }
    }
}

impl fmt::Display for JoinStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinStrategy::Blocking => write!(f, "blocking"),
            JoinStrategy::Polling => write!(f, "polling"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorConfig {
    pub tax_rate: f64,
    pub strategy: JoinStrategy,
    pub poll_interval: Duration,
    /// `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
            strategy: JoinStrategy::Blocking,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregateError {
    #[error("tax worker failed for: {}", symbols.join(", "))]
    WorkerFailed { symbols: Vec<String> },

    #[error("timed out after {elapsed:?} waiting for: {}", pending.join(", "))]
    TimedOut {
        elapsed: Duration,
        pending: Vec<String>,
    },

    #[error("failed to spawn tax worker for {symbol}: {reason}")]
    Spawn { symbol: String, reason: String },
}

/// Counts finished workers. A guard signals on drop, so a panicking worker
/// still counts down and the waiter never hangs on it.
struct CompletionLatch {
    done: Mutex<usize>,
    cvar: Condvar,
}

impl CompletionLatch {
    fn new() -> Self {
        Self {
            done: Mutex::new(0),
            cvar: Condvar::new(),
        }
    }

    fn signal(&self) {
        let mut done = self.done.lock().unwrap_or_else(PoisonError::into_inner);
        *done += 1;
        self.cvar.notify_all();
    }

    /// Returns false if the timeout elapsed first.
    fn wait(&self, target: usize, timeout: Option<Duration>) -> bool {
        let done = self.done.lock().unwrap_or_else(PoisonError::into_inner);
        match timeout {
            None => {
                let _done = self
                    .cvar
                    .wait_while(done, |n| *n < target)
                    .unwrap_or_else(PoisonError::into_inner);
                true
            }
            Some(limit) => {
                let (_done, result) = self
                    .cvar
                    .wait_timeout_while(done, limit, |n| *n < target)
                    .unwrap_or_else(PoisonError::into_inner);
                !result.timed_out()
            }
        }
    }
}

struct LatchGuard(Arc<CompletionLatch>);

impl Drop for LatchGuard {
    fn drop(&mut self) {
        self.0.signal();
    }
}

pub struct TaxAggregator {
    config: AggregatorConfig,
}

impl TaxAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn aggregate(&self, book: &LedgerBook) -> Result<TaxSummary, AggregateError> {
        let rate = self.config.tax_rate;
        let summary = self.fan_out(book, move |ledger| SecurityTax::compute(ledger, rate))?;
        info!(
            strategy = %self.config.strategy,
            securities = summary.securities.len(),
            total_tax = summary.total_tax,
            "aggregated tax"
        );
        Ok(summary)
    }

    pub fn total_tax(&self, book: &LedgerBook) -> Result<f64, AggregateError> {
        Ok(self.aggregate(book)?.total_tax)
    }

    fn fan_out<F>(&self, book: &LedgerBook, work: F) -> Result<TaxSummary, AggregateError>
    where
        F: Fn(&SecurityLedger) -> SecurityTax + Send + Sync + 'static,
    {
        match self.config.strategy {
            JoinStrategy::Blocking => self.blocking_join(book, Arc::new(work)),
            JoinStrategy::Polling => self.polling_join(book, Arc::new(work)),
        }
    }

    fn blocking_join<F>(&self, book: &LedgerBook, work: Arc<F>) -> Result<TaxSummary, AggregateError>
    where
        F: Fn(&SecurityLedger) -> SecurityTax + Send + Sync + 'static,
    {
        let started = Instant::now();
        let latch = Arc::new(CompletionLatch::new());
        let (tx, rx) = mpsc::channel();

        for (n, ledger) in book.ledgers().enumerate() {
            let ledger = ledger.clone();
            let tx = tx.clone();
            let work = Arc::clone(&work);
            let guard = LatchGuard(Arc::clone(&latch));
            let symbol = ledger.symbol.clone();
            spawn_worker(n, &symbol, move || {
                let _guard = guard;
                debug!(symbol = %ledger.symbol, "tax worker started");
                let result = work(&ledger);
                debug!(symbol = %ledger.symbol, tax = result.tax, "tax worker finished");
                let _ = tx.send(result);
            })?;
        }
        drop(tx);

        let expected = book.security_count();
        let finished = latch.wait(expected, self.config.timeout);
        let partials: Vec<SecurityTax> = rx.try_iter().collect();

        if !finished {
            return Err(AggregateError::TimedOut {
                elapsed: started.elapsed(),
                pending: missing_symbols(book, &partials),
            });
        }
        if partials.len() < expected {
            return Err(AggregateError::WorkerFailed {
                symbols: missing_symbols(book, &partials),
            });
        }
        Ok(TaxSummary::from_partials(partials))
    }

    fn polling_join<F>(&self, book: &LedgerBook, work: Arc<F>) -> Result<TaxSummary, AggregateError>
    where
        F: Fn(&SecurityLedger) -> SecurityTax + Send + Sync + 'static,
    {
        let started = Instant::now();
        let (tx, rx) = mpsc::channel();

        for (n, ledger) in book.ledgers().enumerate() {
            let ledger = ledger.clone();
            let tx = tx.clone();
            let work = Arc::clone(&work);
            let symbol = ledger.symbol.clone();
            spawn_worker(n, &symbol, move || {
                let _ = tx.send(work(&ledger));
            })?;
        }
        drop(tx);

        let partials = self.poll_results(book, &rx, started)?;
        Ok(TaxSummary::from_partials(partials))
    }

    fn poll_results(
        &self,
        book: &LedgerBook,
        rx: &Receiver<SecurityTax>,
        started: Instant,
    ) -> Result<Vec<SecurityTax>, AggregateError> {
        let expected = book.security_count();
        let mut partials = Vec::with_capacity(expected);
        let mut empty_polls = 0usize;

        while partials.len() < expected {
            match rx.try_recv() {
                Ok(result) => partials.push(result),
                Err(TryRecvError::Empty) => {
                    if let Some(limit) = self.config.timeout {
                        if started.elapsed() >= limit {
                            return Err(AggregateError::TimedOut {
                                elapsed: started.elapsed(),
                                pending: missing_symbols(book, &partials),
                            });
                        }
                    }
                    empty_polls += 1;
                    thread::sleep(self.config.poll_interval);
                }
                Err(TryRecvError::Disconnected) => {
                    return Err(AggregateError::WorkerFailed {
                        symbols: missing_symbols(book, &partials),
                    });
                }
            }
        }

        debug!(empty_polls, "polling join complete");
        Ok(partials)
    }
}

/// Workers are named by position; symbols are raw input and may contain NUL.
fn spawn_worker<F>(n: usize, symbol: &str, body: F) -> Result<(), AggregateError>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(format!("tax-worker-{n}"))
        .spawn(body)
        .map(|_| ())
        .map_err(|e| AggregateError::Spawn {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })
}

fn missing_symbols(book: &LedgerBook, partials: &[SecurityTax]) -> Vec<String> {
    let seen: BTreeSet<&str> = partials.iter().map(|p| p.symbol.as_str()).collect();
    book.symbols()
        .filter(|s| !seen.contains(s))
        .map(str::to_string)
        .collect()
}
