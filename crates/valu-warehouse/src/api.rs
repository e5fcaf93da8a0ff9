use crate::fundamentals::FundamentalsRecord;
use crate::ticker::Ticker;
use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

/// Why a page yielded no data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("no element matching `{0}`")]
    MissingElement(String),

    #[error("`{0}` is not a number")]
    Parse(String),
}

/// Where live prices come from; how is a single quote **extracted**?
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Latest price for `ticker`, or the reason it is unavailable.
    async fn quote(&self, ticker: &Ticker) -> Result<f64, FetchError>;

    /// Pre-defined `quote()` for callers that only care whether a price exists; the cause
    /// is logged & dropped.
    async fn fetch_price(&self, ticker: &Ticker) -> Option<f64> {
        match self.quote(ticker).await {
            Ok(price) => Some(price),
            Err(e) => {
                warn!("[{ticker}] price unavailable: {e}");
                None
            }
        }
    }
}

/// Where fundamentals come from; how is a statistics page **extracted** & **transformed**?
#[async_trait]
pub trait FundamentalsSource: Send + Sync {
    /// Every field that could be located; missing fields hold [`NOT_AVAILABLE`].
    ///
    /// [`NOT_AVAILABLE`]: crate::fundamentals::NOT_AVAILABLE
    async fn fundamentals(&self, ticker: &Ticker) -> Result<FundamentalsRecord, FetchError>;

    async fn fetch_fundamentals(&self, ticker: &Ticker) -> Option<FundamentalsRecord> {
        match self.fundamentals(ticker).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("[{ticker}] fundamentals unavailable: {e}");
                None
            }
        }
    }
}
