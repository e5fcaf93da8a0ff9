use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use valu_warehouse::fundamentals::Field;

#[derive(Debug, Error)]
pub enum FieldMapError {
    #[error("unknown fundamentals field `{0}`")]
    UnknownField(String),

    #[error("invalid selector `{selector}` for {field}: {reason}")]
    InvalidSelector {
        field: Field,
        selector: String,
        reason: String,
    },
}

/// Where each fundamentals field lives on the statistics page, as CSS selectors.
///
/// The defaults target Yahoo! Finance's `key-statistics` table cells:
/// ```html
/// <td data-test="DEBT_TO_EQUITY-value">0.33</td>
/// ```
/// Any of them can be replaced from a `.json` file keyed by field label:
/// ```json
/// { "Current Ratio": "tr.current-ratio > td:nth-child(2)" }
/// ```
#[derive(Debug, Clone)]
pub struct FieldMap {
    selectors: BTreeMap<Field, (String, Selector)>,
}

impl Default for FieldMap {
    fn default() -> Self {
        let mut selectors = BTreeMap::new();
        for field in Field::ALL {
            let css = format!(r#"td[data-test="{}"]"#, data_test_key(field));
            let selector = Selector::parse(&css).expect("default selectors are valid CSS");
            selectors.insert(field, (css, selector));
        }
        Self { selectors }
    }
}

fn data_test_key(field: Field) -> &'static str {
    match field {
        Field::DebtToEquity => "DEBT_TO_EQUITY-value",
        Field::ReturnOnEquity => "RETURN_ON_EQUITY_TTM-value",
        Field::ProfitMargin => "PROFIT_MARGIN-value",
        Field::RevenueGrowth => "FIVE_YEAR_REVENUE_GROWTH_RATE-value",
        Field::CurrentRatio => "CURRENT_RATIO-value",
    }
}

impl FieldMap {
    /// Replace the selector of `field`.
    pub fn set(&mut self, field: Field, css: &str) -> Result<(), FieldMapError> {
        let selector = Selector::parse(css).map_err(|e| FieldMapError::InvalidSelector {
            field,
            selector: css.to_string(),
            reason: e.to_string(),
        })?;
        self.selectors.insert(field, (css.to_string(), selector));
        Ok(())
    }

    /// Default map with the selectors of `overrides` (label -> CSS) swapped in.
    pub fn with_overrides<I, K, V>(overrides: I) -> Result<Self, FieldMapError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = Self::default();
        for (label, css) in overrides {
            let label = label.as_ref();
            let field =
                Field::from_label(label).ok_or_else(|| FieldMapError::UnknownField(label.to_string()))?;
            map.set(field, css.as_ref())?;
        }
        Ok(map)
    }

    /// Read overrides from a `.json` object of `{ "<field label>": "<selector>" }`.
    pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let overrides: BTreeMap<String, String> = valu_util::read_json(path).await?;
        let map = Self::with_overrides(overrides)?;
        debug!("field map loaded from {}", path.display());
        Ok(map)
    }

    pub fn css(&self, field: Field) -> &str {
        &self.selectors[&field].0
    }

    /// Trimmed text of the first element matching `field`'s selector.
    pub fn extract(&self, document: &Html, field: Field) -> Option<String> {
        let (_, selector) = &self.selectors[&field];
        document
            .select(selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }
}
