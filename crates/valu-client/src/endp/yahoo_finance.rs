use crate::client_ext::ClientExt;
use crate::field_map::FieldMap;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use tracing::{debug, trace};
use valu_warehouse::api::{FetchError, FundamentalsSource, QuoteSource};
use valu_warehouse::fundamentals::{Field, FundamentalsRecord};
use valu_warehouse::ticker::Ticker;

pub const BASE_URL: &str = "https://finance.yahoo.com";

/// The live price on a quote page:
/// ```html
/// <fin-streamer data-field="regularMarketPrice" data-symbol="AAPL">1,169.30</fin-streamer>
/// ```
pub const PRICE_SELECTOR: &str = r#"fin-streamer[data-field="regularMarketPrice"]"#;

fn price_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse(PRICE_SELECTOR).expect("price selector is valid CSS"))
}

/// Yahoo! Finance quote & key-statistics pages.
#[derive(Debug, Clone)]
pub struct YahooFinance {
    client: Client,
    base_url: String,
    fields: FieldMap,
}

impl YahooFinance {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_string(),
            fields: FieldMap::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_field_map(mut self, fields: FieldMap) -> Self {
        self.fields = fields;
        self
    }

    pub fn quote_url(&self, ticker: &Ticker) -> String {
        format!("{}/quote/{ticker}", self.base_url)
    }

    pub fn statistics_url(&self, ticker: &Ticker) -> String {
        format!("{}/quote/{ticker}/key-statistics", self.base_url)
    }
}

#[async_trait]
impl QuoteSource for YahooFinance {
    async fn quote(&self, ticker: &Ticker) -> Result<f64, FetchError> {
        let page = self.client.get_page(&self.quote_url(ticker)).await?;
        let price = parse_price(&page)?;
        trace!("[{ticker}] quote page price {price}");
        Ok(price)
    }
}

#[async_trait]
impl FundamentalsSource for YahooFinance {
    async fn fundamentals(&self, ticker: &Ticker) -> Result<FundamentalsRecord, FetchError> {
        let page = self.client.get_page(&self.statistics_url(ticker)).await?;
        let record = parse_fundamentals(ticker, &page, &self.fields);
        debug!(
            "[{ticker}] {} of {} fundamentals located",
            Field::ALL.iter().filter(|f| record.is_available(**f)).count(),
            Field::ALL.len()
        );
        Ok(record)
    }
}

/// The quote page's live price, with thousands separators removed.
pub fn parse_price(html: &str) -> Result<f64, FetchError> {
    let document = Html::parse_document(html);
    let text = document
        .select(price_selector())
        .next()
        .map(|el| el.text().collect::<String>())
        .ok_or_else(|| FetchError::MissingElement(PRICE_SELECTOR.to_string()))?;

    let cleaned = text.trim().replace(',', "");
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
        .ok_or_else(|| FetchError::Parse(text.trim().to_string()))
}

/// Every field of `fields` found on the statistics page; the rest are left `N/A`.
pub fn parse_fundamentals(ticker: &Ticker, html: &str, fields: &FieldMap) -> FundamentalsRecord {
    let document = Html::parse_document(html);
    let mut record = FundamentalsRecord::new(ticker.clone());
    for field in Field::ALL {
        match fields.extract(&document, field) {
            Some(text) => record.set(field, text),
            None => trace!("[{ticker}] {field} not found at `{}`", fields.css(field)),
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use valu_warehouse::fundamentals::NOT_AVAILABLE;

    #[test]
    fn price_strips_thousands_separator() {
        let html = r#"<div><fin-streamer data-field="regularMarketPrice">1,169.30</fin-streamer></div>"#;
        assert_eq!(parse_price(html), Ok(1169.3));
    }

    #[test]
    fn price_needs_the_right_element() {
        let html = r#"<fin-streamer data-field="regularMarketChange">+1.20</fin-streamer>"#;
        assert_eq!(
            parse_price(html),
            Err(FetchError::MissingElement(PRICE_SELECTOR.to_string()))
        );
    }

    #[test]
    fn price_must_be_numeric() {
        let html = r#"<fin-streamer data-field="regularMarketPrice"> -- </fin-streamer>"#;
        assert_eq!(parse_price(html), Err(FetchError::Parse("--".to_string())));
    }

    #[test]
    fn fundamentals_allow_partial_pages() {
        let html = r#"
            <table>
                <tr><td>Total Debt/Equity (mrq)</td><td data-test="DEBT_TO_EQUITY-value">145.80</td></tr>
                <tr><td>Return on Equity (ttm)</td><td data-test="RETURN_ON_EQUITY_TTM-value">160.58%</td></tr>
            </table>"#;
        let ticker = Ticker::parse("AAPL").unwrap();
        let record = parse_fundamentals(&ticker, html, &FieldMap::default());

        assert_eq!(record.get(Field::DebtToEquity), "145.80");
        assert_eq!(record.get(Field::ReturnOnEquity), "160.58%");
        assert_eq!(record.get(Field::CurrentRatio), NOT_AVAILABLE);
    }

    #[test]
    fn urls_are_keyed_by_ticker() {
        let client = Client::new();
        let yahoo = YahooFinance::new(client).with_base_url("http://localhost:8080/");
        let ticker = Ticker::parse("msft").unwrap();

        assert_eq!(yahoo.quote_url(&ticker), "http://localhost:8080/quote/MSFT");
        assert_eq!(
            yahoo.statistics_url(&ticker),
            "http://localhost:8080/quote/MSFT/key-statistics"
        );
    }
}
