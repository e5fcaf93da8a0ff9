use crate::api::QuoteSource;
use crate::fundamentals::NOT_AVAILABLE;
use crate::history::{HistoryStore, PriceObservation};
use crate::ticker::Ticker;
use crate::watchlist::Watchlist;
use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use futures::{stream, StreamExt};
use std::cmp::Ordering;
use tracing::{debug, info, trace};

/// One row of the live-prices view.
#[derive(Debug, Clone, PartialEq)]
pub struct LivePrice {
    pub ticker: Ticker,
    pub price: Option<f64>,
    pub note: String,
}

impl LivePrice {
    /// The price to two decimal places, or `N/A`.
    pub fn price_label(&self) -> String {
        match self.price {
            Some(price) => format!("{price:.2}"),
            None => NOT_AVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSort {
    /// Ticker, ascending.
    Ticker,
    /// Latest price, descending.
    LatestPrice,
}

/// Stable sort of the live-prices view.
///
/// By price, rows without one go last; by ticker, price plays no part. Equal keys keep their order.
pub fn sort_live_prices(rows: &mut [LivePrice], by: PriceSort) {
    match by {
        PriceSort::Ticker => rows.sort_by(|a, b| a.ticker.cmp(&b.ticker)),
        PriceSort::LatestPrice => rows.sort_by(|a, b| match (a.price, b.price) {
            (Some(a), Some(b)) => b.total_cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
    }
}

/// Outcome of one watchlist refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Refresh {
    /// One row per watchlist entry, in watchlist order.
    pub live: Vec<LivePrice>,
    /// Observations added to the history by this refresh.
    pub appended: Vec<PriceObservation>,
    /// The full history after this refresh.
    pub history: Vec<PriceObservation>,
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Quote every watchlist entry & log each price obtained to the history.
pub struct PriceRefresher<'a, Q> {
    source: &'a Q,
    concurrency: usize,
    clock: fn() -> NaiveDateTime,
}

impl<'a, Q: QuoteSource> PriceRefresher<'a, Q> {
    pub fn new(source: &'a Q) -> Self {
        Self {
            source,
            concurrency: 1,
            clock: local_now,
        }
    }

    /// Number of quote pages requested at once; output order is unaffected.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Where observation timestamps come from; local wall-clock time by default.
    pub fn clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub async fn refresh(&self, watchlist: &Watchlist, history: &HistoryStore) -> Result<Refresh> {
        let mut full_history = history.load()?;

        let source = self.source;
        let mut quotes = stream::iter(watchlist.entries())
            .map(|entry| async move {
                let price = source.fetch_price(&entry.ticker).await;
                (entry, price)
            })
            .buffered(self.concurrency);

        let mut live = Vec::with_capacity(watchlist.len());
        let mut appended = Vec::new();
        while let Some((entry, price)) = quotes.next().await {
            if let Some(price) = price {
                trace!("[{}] latest price {price}", entry.ticker);
                appended.push(PriceObservation {
                    timestamp: (self.clock)(),
                    ticker: entry.ticker.clone(),
                    price,
                });
            }
            live.push(LivePrice {
                ticker: entry.ticker.clone(),
                price,
                note: entry.note.clone(),
            });
        }

        history.append(&appended)?;
        debug!(
            "{} observations appended to {}",
            appended.len(),
            history.path().display()
        );
        info!(
            "{} of {} watchlist prices retrieved",
            appended.len(),
            watchlist.len()
        );

        full_history.extend(appended.iter().cloned());
        Ok(Refresh {
            live,
            appended,
            history: full_history,
        })
    }
}
