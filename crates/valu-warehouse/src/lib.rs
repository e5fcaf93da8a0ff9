//! Domain model & pipelines of the value screener.
//!
//! ```ignore
//! let mut cache = FundamentalsCache::new();
//! let outcome = Screener::new(&source)
//!     .run(&tickers, &mut cache, &ScreenerStore::new(dir))
//!     .await?;
//! ```
pub mod api;
pub mod cache;
pub mod fundamentals;
pub mod history;
pub mod normalize;
pub mod prices;
pub mod score;
pub mod screener;
pub mod ticker;
pub mod watchlist;

pub mod prelude {
    pub use crate::api::{FetchError, FundamentalsSource, QuoteSource};
    pub use crate::cache::FundamentalsCache;
    pub use crate::fundamentals::{Field, FundamentalsRecord, NOT_AVAILABLE};
    pub use crate::history::{HistoryStore, PriceObservation};
    pub use crate::normalize::normalize;
    pub use crate::prices::{LivePrice, PriceRefresher, PriceSort, Refresh};
    pub use crate::score::score;
    pub use crate::screener::{Screener, ScreenerOutcome, ScreenerRow, ScreenerStore};
    pub use crate::ticker::{Ticker, TickerError};
    pub use crate::watchlist::{AddOutcome, RemoveOutcome, Watchlist, WatchlistEntry, WatchlistStore};
}
