use crate::api::FundamentalsSource;
use crate::cache::FundamentalsCache;
use crate::fundamentals::{Field, FundamentalsRecord};
use crate::score::score;
use crate::ticker::Ticker;
use anyhow::Result;
use futures::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

pub const SCREENER_FILE: &str = "screener_data.csv";

pub const SCREENER_HEADERS: [&str; 7] = [
    "Ticker",
    "Debt/Equity",
    "Return on Equity (%)",
    "Profit Margin (%)",
    "5 Year Revenue Growth Rate (%)",
    "Current Ratio",
    "Score",
];

/// One scored ticker, i.e., a row of `screener_data.csv`.
///
/// ```csv
/// Ticker,Debt/Equity,Return on Equity (%),Profit Margin (%),5 Year Revenue Growth Rate (%),Current Ratio,Score
/// MSFT,0.33,35.60%,35.96%,14.62%,1.30,10
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScreenerRow {
    #[serde(rename = "Ticker")]
    pub ticker: Ticker,
    #[serde(rename = "Debt/Equity")]
    pub debt_to_equity: String,
    #[serde(rename = "Return on Equity (%)")]
    pub return_on_equity: String,
    #[serde(rename = "Profit Margin (%)")]
    pub profit_margin: String,
    #[serde(rename = "5 Year Revenue Growth Rate (%)")]
    pub revenue_growth: String,
    #[serde(rename = "Current Ratio")]
    pub current_ratio: String,
    #[serde(rename = "Score")]
    pub score: u8,
}

impl ScreenerRow {
    pub fn new(record: &FundamentalsRecord, score: u8) -> Self {
        Self {
            ticker: record.ticker.clone(),
            debt_to_equity: record.get(Field::DebtToEquity).to_string(),
            return_on_equity: record.get(Field::ReturnOnEquity).to_string(),
            profit_margin: record.get(Field::ProfitMargin).to_string(),
            revenue_growth: record.get(Field::RevenueGrowth).to_string(),
            current_ratio: record.get(Field::CurrentRatio).to_string(),
            score,
        }
    }

    pub fn scored(record: &FundamentalsRecord) -> Self {
        Self::new(record, score(record))
    }

    pub fn record(&self) -> FundamentalsRecord {
        FundamentalsRecord::new(self.ticker.clone())
            .with(Field::DebtToEquity, self.debt_to_equity.as_str())
            .with(Field::ReturnOnEquity, self.return_on_equity.as_str())
            .with(Field::ProfitMargin, self.profit_margin.as_str())
            .with(Field::RevenueGrowth, self.revenue_growth.as_str())
            .with(Field::CurrentRatio, self.current_ratio.as_str())
    }
}

/// `screener_data.csv`; replaced wholesale by every successful run.
#[derive(Debug, Clone)]
pub struct ScreenerStore {
    path: PathBuf,
}

impl ScreenerStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(SCREENER_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, rows: &[ScreenerRow]) -> Result<()> {
        valu_util::write_csv(&self.path, &SCREENER_HEADERS, rows)
    }

    /// `None` until the screener has been run at least once.
    pub fn load(&self) -> Result<Option<Vec<ScreenerRow>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        valu_util::read_csv(&self.path).map(Some)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenerOutcome {
    /// Surviving tickers, best score first.
    Ranked(Vec<ScreenerRow>),

    /// Not a single ticker yielded fundamentals; nothing was persisted.
    Empty,
}

/// Fetch → normalise → score → rank, over a list of tickers.
pub struct Screener<'a, S> {
    source: &'a S,
    concurrency: usize,
}

impl<'a, S: FundamentalsSource> Screener<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            concurrency: 1,
        }
    }

    /// Number of statistics pages requested at once; output order is unaffected.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Score every ticker whose fundamentals are available, best first.
    ///
    /// Ties keep their input order; duplicates in `tickers` produce duplicate rows.
    pub async fn rank(&self, tickers: &[Ticker], cache: &mut FundamentalsCache) -> Vec<ScreenerRow> {
        let mut seen = HashSet::new();
        let pending: Vec<Ticker> = tickers
            .iter()
            .filter(|ticker| !cache.contains(ticker) && seen.insert(*ticker))
            .cloned()
            .collect();
        debug!(
            "{} tickers requested, {} not yet cached",
            tickers.len(),
            pending.len()
        );

        let source = self.source;
        let fetched: Vec<(Ticker, Option<FundamentalsRecord>)> = stream::iter(pending)
            .map(|ticker| async move {
                let record = source.fetch_fundamentals(&ticker).await;
                (ticker, record)
            })
            .buffered(self.concurrency)
            .collect()
            .await;
        for (ticker, record) in fetched {
            cache.insert(ticker, record);
        }

        let mut rows: Vec<ScreenerRow> = tickers
            .iter()
            .filter_map(|ticker| cache.get(ticker).cloned().flatten())
            .map(|record| {
                let row = ScreenerRow::scored(&record);
                trace!("[{}] scored {}", row.ticker, row.score);
                row
            })
            .collect();
        rows.sort_by(|a, b| b.score.cmp(&a.score));
        rows
    }

    /// [`rank`](Self::rank), then persist the table over any previous one.
    pub async fn run(
        &self,
        tickers: &[Ticker],
        cache: &mut FundamentalsCache,
        store: &ScreenerStore,
    ) -> Result<ScreenerOutcome> {
        let rows = self.rank(tickers, cache).await;
        if rows.is_empty() {
            info!("no fundamentals retrieved for {} tickers", tickers.len());
            return Ok(ScreenerOutcome::Empty);
        }

        store.save(&rows)?;
        info!(
            "{} of {} tickers scored; saved to {}",
            rows.len(),
            tickers.len(),
            store.path().display()
        );
        Ok(ScreenerOutcome::Ranked(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fundamentals::NOT_AVAILABLE;

    #[test]
    fn row_keeps_raw_text() {
        let record = FundamentalsRecord::new(Ticker::parse("AAPL").unwrap())
            .with(Field::ReturnOnEquity, "160.58%")
            .with(Field::CurrentRatio, "0.87");
        let row = ScreenerRow::scored(&record);

        assert_eq!(row.return_on_equity, "160.58%");
        assert_eq!(row.debt_to_equity, NOT_AVAILABLE);
        assert_eq!(row.score, 2);
        assert_eq!(row.record(), record);
    }

    #[test]
    fn load_before_first_run_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ScreenerStore::new(dir.path()).load().unwrap().is_none());
    }
}
