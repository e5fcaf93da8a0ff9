use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use valu_warehouse::prelude::*;

/// Statistics pages served from memory; unknown tickers answer 404.
#[derive(Default)]
struct StubStatistics {
    pages: HashMap<String, FundamentalsRecord>,
    requests: Mutex<Vec<String>>,
}

impl StubStatistics {
    fn page(mut self, ticker: &str, fields: &[(Field, &str)]) -> Self {
        let ticker = Ticker::parse(ticker).unwrap();
        let record = fields
            .iter()
            .fold(FundamentalsRecord::new(ticker.clone()), |record, (field, value)| {
                record.with(*field, *value)
            });
        self.pages.insert(ticker.to_string(), record);
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FundamentalsSource for StubStatistics {
    async fn fundamentals(&self, ticker: &Ticker) -> Result<FundamentalsRecord, FetchError> {
        self.requests.lock().unwrap().push(ticker.to_string());
        self.pages
            .get(ticker.as_str())
            .cloned()
            .ok_or(FetchError::Status(404))
    }
}

fn tickers(input: &str) -> Vec<Ticker> {
    Ticker::parse_list(input)
}

fn stub() -> StubStatistics {
    StubStatistics::default()
        .page(
            "MSFT",
            &[
                (Field::DebtToEquity, "0.33"),
                (Field::ReturnOnEquity, "35.60%"),
                (Field::ProfitMargin, "35.96%"),
                (Field::RevenueGrowth, "14.62%"),
                (Field::CurrentRatio, "1.30"),
            ],
        )
        .page(
            "TSLA",
            &[
                (Field::DebtToEquity, "0.18"),
                (Field::ProfitMargin, "7.26%"),
            ],
        )
        .page("AMZN", &[(Field::DebtToEquity, "0.54")])
}

#[tokio::test]
async fn failed_fetch_is_excluded_and_table_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let store = ScreenerStore::new(dir.path());
    let source = stub();
    let mut cache = FundamentalsCache::new();

    let outcome = Screener::new(&source)
        .run(&tickers("tsla, NOPE, msft"), &mut cache, &store)
        .await
        .unwrap();

    let ScreenerOutcome::Ranked(rows) = outcome else {
        panic!("expected a ranked table");
    };
    let ranked: Vec<(&str, u8)> = rows.iter().map(|r| (r.ticker.as_str(), r.score)).collect();
    assert_eq!(ranked, [("MSFT", 10), ("TSLA", 2)]);

    let persisted = store.load().unwrap().expect("screener table on disk");
    assert_eq!(persisted, rows);

    let header = std::fs::read_to_string(store.path()).unwrap();
    assert!(header.starts_with(
        "Ticker,Debt/Equity,Return on Equity (%),Profit Margin (%),5 Year Revenue Growth Rate (%),Current Ratio,Score\n"
    ));
}

#[tokio::test]
async fn equal_scores_keep_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let source = stub();
    let mut cache = FundamentalsCache::new();

    let rows = Screener::new(&source)
        .concurrency(3)
        .rank(&tickers("amzn, tsla, msft"), &mut cache)
        .await;

    let order: Vec<&str> = rows.iter().map(|r| r.ticker.as_str()).collect();
    assert_eq!(order, ["MSFT", "AMZN", "TSLA"]);
    assert!(!dir.path().join("screener_data.csv").exists());
}

#[tokio::test]
async fn duplicates_are_fetched_once_but_listed_twice() {
    let source = stub();
    let mut cache = FundamentalsCache::new();
    let screener = Screener::new(&source);

    let rows = screener
        .rank(&tickers("TSLA, nope, tsla, NOPE"), &mut cache)
        .await;
    assert_eq!(rows.len(), 2);
    assert_eq!(source.requests(), ["TSLA", "NOPE"]);

    // a second pass within the same run is served from the cache
    screener.rank(&tickers("TSLA, MSFT"), &mut cache).await;
    assert_eq!(source.requests(), ["TSLA", "NOPE", "MSFT"]);
    assert_eq!(cache.len(), 3);

    cache.clear();
    screener.rank(&tickers("TSLA"), &mut cache).await;
    assert_eq!(source.requests().len(), 4);
}

#[tokio::test]
async fn empty_result_leaves_previous_table_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = ScreenerStore::new(dir.path());
    let source = stub();

    Screener::new(&source)
        .run(&tickers("MSFT"), &mut FundamentalsCache::new(), &store)
        .await
        .unwrap();
    let before = std::fs::read(store.path()).unwrap();

    let outcome = Screener::new(&source)
        .run(&tickers("NOPE, ALSO-NOPE"), &mut FundamentalsCache::new(), &store)
        .await
        .unwrap();

    assert_eq!(outcome, ScreenerOutcome::Empty);
    assert_eq!(std::fs::read(store.path()).unwrap(), before);
}

#[tokio::test]
async fn new_run_replaces_old_table() {
    let dir = tempfile::tempdir().unwrap();
    let store = ScreenerStore::new(dir.path());
    let source = stub();

    Screener::new(&source)
        .run(&tickers("MSFT, TSLA"), &mut FundamentalsCache::new(), &store)
        .await
        .unwrap();
    Screener::new(&source)
        .run(&tickers("AMZN"), &mut FundamentalsCache::new(), &store)
        .await
        .unwrap();

    let persisted = store.load().unwrap().unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].ticker.as_str(), "AMZN");
    assert_eq!(persisted[0].current_ratio, NOT_AVAILABLE);
}
