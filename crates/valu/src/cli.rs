use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::Level;
use valu_warehouse::prices::PriceSort;

/// Tickers screened when none are given.
pub const DEFAULT_TICKERS: &str = "AAPL, TSLA, MSFT, NVDA, AMZN";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing
    #[arg(long, default_value = "info", ignore_case = true, global = true)]
    pub trace: TraceLevel,

    /// Directory holding the screener, watchlist & price history files [default: $VALU_DATA_DIR or .]
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Number of pages requested at once.
    #[arg(long, default_value_t = 1, global = true)]
    pub concurrency: usize,

    /// `.json` file replacing statistics-page selectors, keyed by field label.
    #[arg(long, global = true)]
    pub field_map: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score comma-separated tickers on their fundamentals & save the ranking.
    Screen {
        #[arg(default_value = DEFAULT_TICKERS)]
        tickers: String,
    },

    /// Show the saved fundamentals of a screened ticker.
    Details { ticker: Option<String> },

    /// Manage the watchlist & fetch its live prices.
    Watchlist {
        #[command(subcommand)]
        action: WatchlistAction,
    },

    /// Chart the recorded prices of a watchlist ticker.
    Trend { ticker: Option<String> },
}

#[derive(Subcommand, Debug)]
pub enum WatchlistAction {
    /// Add a ticker, with an optional personal note.
    Add {
        ticker: String,

        #[arg(long, default_value = "")]
        note: String,
    },

    /// Remove a ticker; asks which one when none is given.
    Remove { ticker: Option<String> },

    /// Fetch the latest price of every ticker & record it in the price history.
    Prices {
        #[arg(long, value_enum, default_value_t = SortBy::Ticker)]
        sort: SortBy,
    },
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum SortBy {
    /// Ticker, A to Z.
    Ticker,

    /// Latest price, highest first; tickers without a price go last.
    Price,
}

impl From<SortBy> for PriceSort {
    fn from(sort: SortBy) -> Self {
        match sort {
            SortBy::Ticker => PriceSort::Ticker,
            SortBy::Price => PriceSort::LatestPrice,
        }
    }
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraceLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<TraceLevel> for Level {
    fn from(level: TraceLevel) -> Self {
        match level {
            TraceLevel::Debug => Level::DEBUG,
            TraceLevel::Info => Level::INFO,
            TraceLevel::Warn => Level::WARN,
            TraceLevel::Error => Level::ERROR,
        }
    }
}
