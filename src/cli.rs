//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use crate::adapters::console_report_adapter::ConsoleReportAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::line_file_adapter::LineFileAdapter;
use crate::domain::aggregator::{AggregatorConfig, DEFAULT_POLL_INTERVAL, JoinStrategy};
use crate::domain::book::{BookBuild, build_book};
use crate::domain::config_validation::{validate_aggregator_config, validate_tax_config};
use crate::domain::currency::DEFAULT_CURRENCY_SYMBOL;
use crate::domain::engine::{RunConfig, TaxRun, run_tax};
use crate::domain::error::CapgainsError;
use crate::domain::tax::DEFAULT_TAX_RATE;
use crate::ports::config_port::ConfigPort;
use crate::ports::ledger_port::LedgerPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "capgains", about = "FIFO capital-gains tax calculator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Ledger file, one `date,symbol,side,quantity,price` per line; `-` reads stdin
    #[arg(short, long, default_value = "-")]
    pub ledger: PathBuf,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub strategy: Option<JoinStrategy>,
    #[arg(long)]
    pub rate: Option<f64>,
    #[arg(long)]
    pub currency: Option<String>,
    /// Give up on workers after this many milliseconds; 0 waits forever
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    /// Fail if any record is rejected
    #[arg(long)]
    pub strict: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Csv,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the total tax due
    Tax {
        #[command(flatten)]
        args: RunArgs,
    },
    /// Print a per-security breakdown
    Report {
        #[command(flatten)]
        args: RunArgs,
        /// Show lot matches under each security
        #[arg(long)]
        lots: bool,
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,
    },
    /// Parse a ledger and list rejected records by record number (blank lines
    /// are not counted)
    Validate {
        #[arg(short, long, default_value = "-")]
        ledger: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match dispatch(cli.command, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn dispatch(command: Command, out: &mut dyn Write) -> Result<(), CapgainsError> {
    match command {
        Command::Tax { args } => run_total(&args, out),
        Command::Report { args, lots, format } => run_report(&args, lots, format, out),
        Command::Validate { ledger } => run_validate(&ledger, out),
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, CapgainsError> {
    match path {
        Some(p) => FileConfigAdapter::from_file(p),
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// Resolve the run configuration: command-line overrides win over the file,
/// the file wins over built-in defaults.
pub fn build_run_config(config: &dyn ConfigPort, args: &RunArgs) -> Result<RunConfig, CapgainsError> {
    validate_tax_config(config)?;
    validate_aggregator_config(config)?;

    let tax_rate = match args.rate {
        Some(rate) if !(0.0..=1.0).contains(&rate) => {
            return Err(CapgainsError::ConfigInvalid {
                section: "tax".into(),
                key: "rate".into(),
                reason: "rate must be between 0 and 1".into(),
            });
        }
        Some(rate) => rate,
        None => config.get_double("tax", "rate", DEFAULT_TAX_RATE),
    };

    let strategy = match args.strategy {
        Some(s) => s,
        None => config
            .get_string("aggregator", "strategy")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default(),
    };

    let timeout = match args.timeout_ms {
        Some(0) => None,
        Some(ms) => Some(Duration::from_millis(ms)),
        None => config.get_duration_ms("aggregator", "timeout_ms"),
    };

    let currency_symbol = args
        .currency
        .clone()
        .or_else(|| config.get_string("tax", "currency_symbol"))
        .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string());

    Ok(RunConfig {
        aggregator: AggregatorConfig {
            tax_rate,
            strategy,
            poll_interval: config
                .get_duration_ms("aggregator", "poll_interval_ms")
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            timeout,
        },
        currency_symbol,
    })
}

fn execute_run(args: &RunArgs) -> Result<TaxRun, CapgainsError> {
    // Stage 1: Load and resolve config
    let adapter = load_config(args.config.as_ref())?;
    let run_config = build_run_config(&adapter, args)?;

    // Stage 2: Read ledger
    let ledger = LineFileAdapter::from_path(args.ledger.clone());
    let records = ledger.read_records()?;
    tracing::info!(
        source = %ledger.source_name(),
        records = records.len(),
        strategy = %run_config.aggregator.strategy,
        "loaded ledger"
    );

    // Stage 3: Group, compute, reduce
    let run = run_tax(&records, &run_config)?;

    // Stage 4: Surface rejected records
    report_rejected(&run.build);
    if args.strict && !run.build.is_clean() {
        return Err(CapgainsError::RecordsRejected {
            rejected: run.build.rejected.len(),
            total: run.build.records_seen,
        });
    }

    Ok(run)
}

fn report_rejected(build: &BookBuild) {
    if build.is_clean() {
        return;
    }
    eprintln!(
        "warning: {} of {} records rejected (run `capgains validate` for details)",
        build.rejected.len(),
        build.records_seen
    );
}

fn run_total(args: &RunArgs, out: &mut dyn Write) -> Result<(), CapgainsError> {
    let run = execute_run(args)?;
    ConsoleReportAdapter::new(out).write_total(run.total_tax(), &run.currency_symbol)
}

fn run_report(
    args: &RunArgs,
    lots: bool,
    format: ReportFormat,
    out: &mut dyn Write,
) -> Result<(), CapgainsError> {
    let run = execute_run(args)?;
    let mut port: Box<dyn ReportPort + '_> = match format {
        ReportFormat::Text => Box::new(ConsoleReportAdapter::new(out).with_lots(lots)),
        ReportFormat::Csv => Box::new(CsvReportAdapter::new(out)),
    };
    port.write_breakdown(&run.summary, &run.currency_symbol)
}

fn run_validate(ledger_path: &PathBuf, out: &mut dyn Write) -> Result<(), CapgainsError> {
    let ledger = LineFileAdapter::from_path(ledger_path.clone());
    let records = ledger.read_records()?;
    let build = build_book(&records);

    writeln!(
        out,
        "{}: {} records, {} securities, {} rejected",
        ledger.source_name(),
        build.records_seen,
        build.book.security_count(),
        build.rejected.len()
    )?;
    for rejected in &build.rejected {
        writeln!(
            out,
            "  record {} ({}): {}",
            rejected.record_number,
            rejected.error.field(),
            rejected.error
        )?;
    }

    if build.is_clean() {
        Ok(())
    } else {
        Err(CapgainsError::RecordsRejected {
            rejected: build.rejected.len(),
            total: build.records_seen,
        })
    }
}
