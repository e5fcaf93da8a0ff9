use crate::ticker::Ticker;
use anyhow::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const HISTORY_FILE: &str = "price_history.csv";
pub const HISTORY_HEADERS: [&str; 3] = ["Timestamp", "Ticker", "Price"];
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A price seen for a ticker at a point in (local) time.
///
/// ```csv
/// Timestamp,Ticker,Price
/// 2024-05-01 14:03:22,AAPL,169.3
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PriceObservation {
    #[serde(rename = "Timestamp", with = "timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "Ticker")]
    pub ticker: Ticker,
    #[serde(rename = "Price")]
    pub price: f64,
}

mod timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let text = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)
            .map_err(serde::de::Error::custom)
    }
}

/// `price_history.csv`; an append-only log of every observation.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Point at the history in `dir` without creating it.
    pub fn at(dir: &Path) -> Self {
        Self {
            path: dir.join(HISTORY_FILE),
        }
    }

    /// Point at the history in `dir`, creating an empty one if there is none yet.
    pub fn open(dir: &Path) -> Result<Self> {
        let store = Self::at(dir);
        if valu_util::ensure_csv(&store.path, &HISTORY_HEADERS)? {
            debug!("initialised empty price history");
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<PriceObservation>> {
        valu_util::read_csv(&self.path)
    }

    /// `None` when no history has been started yet.
    pub fn load_existing(&self) -> Result<Option<Vec<PriceObservation>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        self.load().map(Some)
    }

    /// Add a batch of observations to the end of the log, in one write.
    pub fn append(&self, observations: &[PriceObservation]) -> Result<()> {
        valu_util::append_csv(&self.path, observations)
    }
}

/// Observations for `ticker`, oldest first.
pub fn trend(history: &[PriceObservation], ticker: &Ticker) -> Vec<PriceObservation> {
    let mut points: Vec<PriceObservation> = history
        .iter()
        .filter(|obs| &obs.ticker == ticker)
        .cloned()
        .collect();
    points.sort_by_key(|obs| obs.timestamp);
    points
}

/// Every ticker's observations, oldest first within each ticker.
pub fn group_by_ticker(history: &[PriceObservation]) -> BTreeMap<Ticker, Vec<PriceObservation>> {
    let mut groups: BTreeMap<Ticker, Vec<PriceObservation>> = BTreeMap::new();
    for obs in history {
        groups.entry(obs.ticker.clone()).or_default().push(obs.clone());
    }
    for points in groups.values_mut() {
        points.sort_by_key(|obs| obs.timestamp);
    }
    groups
}
