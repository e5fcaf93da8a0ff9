use crate::ticker::Ticker;
use std::fmt;

/// Recorded in place of a field that could not be located on the statistics page.
pub const NOT_AVAILABLE: &str = "N/A";

/// The fixed set of fundamentals scraped per ticker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    DebtToEquity,
    ReturnOnEquity,
    ProfitMargin,
    RevenueGrowth,
    CurrentRatio,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::DebtToEquity,
        Field::ReturnOnEquity,
        Field::ProfitMargin,
        Field::RevenueGrowth,
        Field::CurrentRatio,
    ];

    /// Column name, as persisted in `screener_data.csv`.
    pub fn label(self) -> &'static str {
        match self {
            Field::DebtToEquity => "Debt/Equity",
            Field::ReturnOnEquity => "Return on Equity (%)",
            Field::ProfitMargin => "Profit Margin (%)",
            Field::RevenueGrowth => "5 Year Revenue Growth Rate (%)",
            Field::CurrentRatio => "Current Ratio",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.label() == label)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw fundamentals text for one ticker, exactly as scraped.
#[derive(Clone, Debug, PartialEq)]
pub struct FundamentalsRecord {
    pub ticker: Ticker,
    values: [String; 5],
}

impl FundamentalsRecord {
    /// A record with every field [`NOT_AVAILABLE`].
    pub fn new(ticker: Ticker) -> Self {
        Self {
            ticker,
            values: std::array::from_fn(|_| NOT_AVAILABLE.to_string()),
        }
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn is_available(&self, field: Field) -> bool {
        self.get(field) != NOT_AVAILABLE
    }
}
