use crate::ticker::{Ticker, TickerError};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const WATCHLIST_FILE: &str = "watchlist.csv";
pub const WATCHLIST_HEADERS: [&str; 2] = ["Ticker", "Note"];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WatchlistEntry {
    #[serde(rename = "Ticker")]
    pub ticker: Ticker,
    #[serde(rename = "Note", default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added(Ticker),
    /// Already on the watchlist; nothing changed.
    Duplicate(Ticker),
    /// The input was not a usable ticker; nothing changed.
    Rejected(TickerError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoveOutcome {
    Removed(WatchlistEntry),
    /// No entry for this input; nothing changed.
    NotFound(String),
}

/// User-curated tickers, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Watchlist {
    entries: Vec<WatchlistEntry>,
}

impl Watchlist {
    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn tickers(&self) -> impl Iterator<Item = &Ticker> {
        self.entries.iter().map(|entry| &entry.ticker)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.tickers().any(|t| t == ticker)
    }

    pub fn add(&mut self, raw_ticker: &str, note: &str) -> AddOutcome {
        let ticker = match Ticker::parse(raw_ticker) {
            Ok(ticker) => ticker,
            Err(e) => return AddOutcome::Rejected(e),
        };
        if self.contains(&ticker) {
            return AddOutcome::Duplicate(ticker);
        }
        self.entries.push(WatchlistEntry {
            ticker: ticker.clone(),
            note: note.trim().to_string(),
        });
        AddOutcome::Added(ticker)
    }

    pub fn remove(&mut self, raw_ticker: &str) -> RemoveOutcome {
        let position = Ticker::parse(raw_ticker)
            .ok()
            .and_then(|ticker| self.entries.iter().position(|e| e.ticker == ticker));
        match position {
            Some(i) => RemoveOutcome::Removed(self.entries.remove(i)),
            None => RemoveOutcome::NotFound(raw_ticker.trim().to_string()),
        }
    }
}

impl From<Vec<WatchlistEntry>> for Watchlist {
    fn from(entries: Vec<WatchlistEntry>) -> Self {
        Self { entries }
    }
}

/// `watchlist.csv`; every change rewrites the whole file.
#[derive(Debug, Clone)]
pub struct WatchlistStore {
    path: PathBuf,
}

impl WatchlistStore {
    /// Point at the watchlist in `dir`, creating an empty one if there is none yet.
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(WATCHLIST_FILE);
        if valu_util::ensure_csv(&path, &WATCHLIST_HEADERS)? {
            debug!("initialised empty watchlist");
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Watchlist> {
        let entries: Vec<WatchlistEntry> = valu_util::read_csv(&self.path)?;
        Ok(Watchlist::from(entries))
    }

    pub fn save(&self, watchlist: &Watchlist) -> Result<()> {
        valu_util::write_csv(&self.path, &WATCHLIST_HEADERS, watchlist.entries())
    }

    pub fn add(&self, raw_ticker: &str, note: &str) -> Result<AddOutcome> {
        let mut watchlist = self.load()?;
        let outcome = watchlist.add(raw_ticker, note);
        if let AddOutcome::Added(ticker) = &outcome {
            self.save(&watchlist)?;
            info!("[{ticker}] added to watchlist");
        }
        Ok(outcome)
    }

    pub fn remove(&self, raw_ticker: &str) -> Result<RemoveOutcome> {
        let mut watchlist = self.load()?;
        let outcome = watchlist.remove(raw_ticker);
        if let RemoveOutcome::Removed(entry) = &outcome {
            self.save(&watchlist)?;
            info!("[{}] removed from watchlist", entry.ticker);
        }
        Ok(outcome)
    }
}
