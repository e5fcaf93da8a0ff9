use crate::fundamentals::FundamentalsRecord;
use crate::ticker::Ticker;
use std::collections::HashMap as Map;

/// Fundamentals already fetched during one run, keyed by ticker.
///
/// Failed fetches are remembered too (as `None`), so a ticker is requested at most once
/// for as long as the cache lives.
#[derive(Debug, Default)]
pub struct FundamentalsCache {
    entries: Map<Ticker, Option<FundamentalsRecord>>,
}

impl FundamentalsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when `ticker` has not been fetched yet.
    pub fn get(&self, ticker: &Ticker) -> Option<&Option<FundamentalsRecord>> {
        self.entries.get(ticker)
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.entries.contains_key(ticker)
    }

    pub fn insert(&mut self, ticker: Ticker, outcome: Option<FundamentalsRecord>) {
        self.entries.insert(ticker, outcome);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
