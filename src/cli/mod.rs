//! Command-line interface definitions.

pub mod output;
pub mod symbols;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use symbols::run;

/// finance-api - rate-limited market-data lookups backed by SQLite.
#[derive(Parser, Debug)]
#[command(name = "finance-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults apply when omitted and
    /// `config.toml` does not exist)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a symbol through cache, database and Twelve Data
    Get(SymbolArg),

    /// Store a symbol read from a JSON file
    Add(FileArg),

    /// Apply a partial update read from a JSON file
    Update(FileArg),

    /// Remove a stored symbol
    Delete(SymbolArg),

    /// List stored symbols
    List,

    /// Keep resolving symbols on an interval until Ctrl-C
    ///
    /// One pipeline serves every round, so repeated lookups are answered by
    /// the cache and origin calls share the rate limit.
    Watch(WatchArg),
}

/// Argument for commands addressing one symbol.
#[derive(Parser, Debug)]
pub struct SymbolArg {
    /// Ticker, e.g. AAPL or EUR/USD
    pub symbol: String,
}

/// Arguments for `watch`.
#[derive(Parser, Debug)]
pub struct WatchArg {
    /// Tickers to resolve each round
    #[arg(required = true)]
    pub symbols: Vec<String>,

    /// Seconds between rounds
    #[arg(short, long, default_value_t = 60)]
    pub interval_secs: u64,
}

/// Argument for commands reading a JSON document.
#[derive(Parser, Debug)]
pub struct FileArg {
    /// JSON file to read, `-` for stdin
    #[arg(short, long)]
    pub file: PathBuf,
}
