use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// A security's symbol, e.g., `AAPL`, `BRK-B`, `^GSPC`.
///
/// Always trimmed, uppercased & non-empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TickerError {
    #[error("ticker symbol is empty")]
    Empty,

    #[error("ticker symbol `{0}` contains the invalid character `{1}`")]
    Invalid(String, char),
}

impl Ticker {
    pub fn parse(raw: &str) -> Result<Self, TickerError> {
        let symbol = raw.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(TickerError::Empty);
        }
        if let Some(c) = symbol
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
        {
            return Err(TickerError::Invalid(symbol, c));
        }
        Ok(Self(symbol))
    }

    /// Split comma-separated user input, e.g., `"aapl, tsla,msft"`.
    ///
    /// Input order & duplicates are kept; unusable items are skipped with a warning.
    pub fn parse_list(input: &str) -> Vec<Self> {
        input
            .split(',')
            .filter_map(|item| match Self::parse(item) {
                Ok(ticker) => Some(ticker),
                Err(e) => {
                    warn!("skipping ticker {item:?}: {e}");
                    None
                }
            })
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ticker {
    type Err = TickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = TickerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}
