use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use valu_warehouse::history::{trend, HISTORY_FILE};
use valu_warehouse::prelude::*;
use valu_warehouse::prices::sort_live_prices;

/// Quote pages served from memory; unknown tickers have no price element.
struct StubQuotes(HashMap<&'static str, f64>);

#[async_trait]
impl QuoteSource for StubQuotes {
    async fn quote(&self, ticker: &Ticker) -> Result<f64, FetchError> {
        self.0
            .get(ticker.as_str())
            .copied()
            .ok_or_else(|| FetchError::MissingElement("fin-streamer".to_string()))
    }
}

fn fixed_clock() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(14, 3, 22)
        .unwrap()
}

fn quotes() -> StubQuotes {
    StubQuotes(HashMap::from([("AAPL", 169.3), ("MSFT", 410.25)]))
}

#[test]
fn adding_same_ticker_in_other_case_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = WatchlistStore::open(dir.path()).unwrap();

    let first = store.add("aapl", "").unwrap();
    let second = store.add("AAPL", "again").unwrap();

    assert_eq!(first, AddOutcome::Added(Ticker::parse("AAPL").unwrap()));
    assert_eq!(second, AddOutcome::Duplicate(Ticker::parse("AAPL").unwrap()));
    let watchlist = store.load().unwrap();
    assert_eq!(watchlist.len(), 1);
    assert_eq!(watchlist.entries()[0].ticker.as_str(), "AAPL");
}

#[tokio::test]
async fn refresh_appends_one_row_per_price() {
    let dir = tempfile::tempdir().unwrap();
    let watchlist_store = WatchlistStore::open(dir.path()).unwrap();
    let history = HistoryStore::open(dir.path()).unwrap();

    let prior = "Timestamp,Ticker,Price\n2024-04-30 09:30:00,AAPL,170.10\n";
    std::fs::write(dir.path().join(HISTORY_FILE), prior).unwrap();

    watchlist_store.add("AAPL", "core").unwrap();
    watchlist_store.add("NVDA", "").unwrap();
    let watchlist = watchlist_store.load().unwrap();

    let source = quotes();
    let refresh = PriceRefresher::new(&source)
        .clock(fixed_clock)
        .refresh(&watchlist, &history)
        .await
        .unwrap();

    assert_eq!(refresh.live.len(), 2);
    assert_eq!(refresh.live[0].price, Some(169.3));
    assert_eq!(refresh.live[0].note, "core");
    assert_eq!(refresh.live[1].price_label(), "N/A");

    assert_eq!(
        refresh.appended,
        [PriceObservation {
            timestamp: fixed_clock(),
            ticker: Ticker::parse("AAPL").unwrap(),
            price: 169.3,
        }]
    );
    assert_eq!(refresh.history.len(), 2);

    let text = std::fs::read_to_string(history.path()).unwrap();
    assert_eq!(text, format!("{prior}2024-05-01 14:03:22,AAPL,169.3\n"));
    assert_eq!(history.load().unwrap(), refresh.history);

    let points = trend(&refresh.history, &Ticker::parse("AAPL").unwrap());
    assert_eq!(points.iter().map(|p| p.price).collect::<Vec<_>>(), [170.1, 169.3]);
}

#[tokio::test]
async fn refresh_without_prices_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let history = HistoryStore::open(dir.path()).unwrap();
    let before = std::fs::read(history.path()).unwrap();

    let mut watchlist = Watchlist::default();
    watchlist.add("NVDA", "");
    watchlist.add("AMD", "");

    let source = quotes();
    let refresh = PriceRefresher::new(&source)
        .concurrency(4)
        .refresh(&watchlist, &history)
        .await
        .unwrap();

    assert!(refresh.appended.is_empty());
    assert!(refresh.live.iter().all(|row| row.price.is_none()));
    assert_eq!(std::fs::read(history.path()).unwrap(), before);
}

#[tokio::test]
async fn live_prices_sort_deterministically() {
    let dir = tempfile::tempdir().unwrap();
    let history = HistoryStore::open(dir.path()).unwrap();

    let mut watchlist = Watchlist::default();
    for ticker in ["NVDA", "AAPL", "MSFT"] {
        watchlist.add(ticker, "");
    }

    let source = quotes();
    let refresher = PriceRefresher::new(&source).clock(fixed_clock);
    for _ in 0..3 {
        let mut live = refresher.refresh(&watchlist, &history).await.unwrap().live;
        sort_live_prices(&mut live, PriceSort::LatestPrice);
        let order: Vec<&str> = live.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(order, ["MSFT", "AAPL", "NVDA"]);
    }
    assert_eq!(history.load().unwrap().len(), 6);
}
