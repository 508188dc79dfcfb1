//! CLI definitions.

pub mod commands;
mod output;

pub use output::OutputFormat;

use anyhow::Result;
use chrono::{Days, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use stockscope_core::types::{DateRange, Symbol};
use stockscope_indicators::IndicatorSpec;

#[derive(Parser)]
#[command(name = "stockscope")]
#[command(author, version, about = "Daily price history, technical indicators and strategy signals")]
pub struct Cli {
    /// Configuration file path [default: config/default.toml when present]
    #[arg(short, long, env = "STOCKSCOPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level [default: from configuration]
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show daily prices for a symbol
    Series(SeriesArgs),
    /// Compute technical indicators for a symbol
    Indicators(IndicatorsArgs),
    /// Evaluate a strategy over a symbol's history
    Signals(SignalsArgs),
    /// List available strategies
    Strategies(StrategiesArgs),
    /// Inspect or clear the price cache
    #[command(subcommand)]
    Cache(CacheCommand),
    /// Validate configuration
    ValidateConfig(ValidateArgs),
}

/// Date range selection shared by the data commands.
#[derive(clap::Args, Clone)]
pub struct RangeArgs {
    /// Start date (YYYY-MM-DD) [default: end minus --days]
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD) [default: today]
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Calendar days to cover when --start is omitted
    #[arg(long, default_value = "180")]
    pub days: u64,
}

impl RangeArgs {
    pub fn resolve(&self) -> Result<DateRange> {
        let end = self.end.unwrap_or_else(|| Utc::now().date_naive());
        let start = match self.start {
            Some(start) => start,
            None => end
                .checked_sub_days(Days::new(self.days))
                .unwrap_or(NaiveDate::MIN),
        };
        Ok(DateRange::new(start, end)?)
    }
}

#[derive(clap::Args)]
pub struct SeriesArgs {
    /// Ticker symbol
    pub symbol: Symbol,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct IndicatorsArgs {
    /// Ticker symbol
    pub symbol: Symbol,

    /// Indicators to compute (comma-separated, e.g. SMA_20,RSI_14,MACD_12_26_9)
    /// [default: the standard set]
    #[arg(short, long, value_delimiter = ',')]
    pub indicators: Vec<IndicatorSpec>,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Only print the last N rows
    #[arg(long)]
    pub tail: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct SignalsArgs {
    /// Ticker symbol
    pub symbol: Symbol,

    /// Strategy to evaluate
    #[arg(short, long)]
    pub strategy: String,

    /// Strategy parameters as JSON; omitted fields use defaults
    #[arg(short, long)]
    pub params: Option<String>,

    /// Strategy parameters from a JSON file
    #[arg(long, conflicts_with = "params")]
    pub params_file: Option<PathBuf>,

    /// Include HOLD signals
    #[arg(long)]
    pub all: bool,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct StrategiesArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// List cached symbols
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },
    /// Remove cached entries (all of them when no symbol is given)
    Clear {
        /// Symbols to remove
        symbols: Vec<Symbol>,
    },
}

#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Print the effective configuration
    #[arg(long)]
    pub show: bool,
}
