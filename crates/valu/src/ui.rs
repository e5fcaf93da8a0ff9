use anyhow::Result;
use async_trait::async_trait;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, FuzzySelect};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;
use valu_warehouse::history::{PriceObservation, TIMESTAMP_FORMAT};
use valu_warehouse::prelude::*;
use valu_warehouse::score::RULES;

pub fn single_pb(length: u64) -> ProgressBar {
    let pb = ProgressBar::new(length);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [ {bar:30} ] {pos}/{len} {msg} {spinner}")
            .expect("progress template is valid")
            .progress_chars("#|-"),
    );
    pb
}

/// A source that reports each request on a progress bar.
pub struct Tracked<'a, S> {
    inner: &'a S,
    pb: ProgressBar,
}

impl<'a, S> Tracked<'a, S> {
    pub fn new(inner: &'a S, pb: ProgressBar) -> Self {
        Self { inner, pb }
    }
}

#[async_trait]
impl<S: FundamentalsSource> FundamentalsSource for Tracked<'_, S> {
    async fn fundamentals(&self, ticker: &Ticker) -> Result<FundamentalsRecord, FetchError> {
        self.pb.set_message(format!("Fetching {ticker}..."));
        let record = self.inner.fundamentals(ticker).await;
        self.pb.inc(1);
        record
    }
}

#[async_trait]
impl<S: QuoteSource> QuoteSource for Tracked<'_, S> {
    async fn quote(&self, ticker: &Ticker) -> Result<f64, FetchError> {
        self.pb.set_message(format!("Fetching price for {ticker}..."));
        let price = self.inner.quote(ticker).await;
        self.pb.inc(1);
        price
    }
}

// -------------------------------------------------------------------------------------------------
// status lines

pub fn heading(text: impl Display) {
    println!("\n{}", text.to_string().bold());
}

pub fn success(text: impl Display) {
    println!("{}", text.to_string().green());
}

pub fn info(text: impl Display) {
    println!("{}", text.to_string().cyan());
}

pub fn warning(text: impl Display) {
    println!("{}", text.to_string().yellow());
}

pub fn failure(text: impl Display) {
    println!("{}", text.to_string().red());
}

/// Fuzzy-pick one of `items`, returning its index.
pub fn select<T: ToString>(prompt: &str, items: &[T]) -> Result<usize> {
    let selection = FuzzySelect::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(0)
        .items(items)
        .interact()?;
    Ok(selection)
}

// -------------------------------------------------------------------------------------------------
// tables & charts

/// Plain-text table; every column is padded to its widest cell.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[&str]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let rules: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut out = vec![
        line(headers),
        line(&rules.iter().map(String::as_str).collect::<Vec<_>>()),
    ];
    for row in rows {
        out.push(line(&row.iter().map(String::as_str).collect::<Vec<_>>()));
    }
    out.join("\n")
}

pub fn screener_table(rows: &[ScreenerRow]) -> String {
    let headers = ["Ticker"]
        .into_iter()
        .chain(Field::ALL.iter().map(|f| f.label()))
        .chain(["Score"])
        .collect::<Vec<_>>();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let record = row.record();
            std::iter::once(row.ticker.to_string())
                .chain(Field::ALL.iter().map(|f| record.get(*f).to_string()))
                .chain(std::iter::once(row.score.to_string()))
                .collect()
        })
        .collect();
    render_table(&headers, &cells)
}

pub fn live_prices_table(rows: &[LivePrice]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| vec![row.ticker.to_string(), row.price_label(), row.note.clone()])
        .collect();
    render_table(&["Ticker", "Latest Price", "Note"], &cells)
}

pub fn history_table(points: &[PriceObservation]) -> String {
    let cells: Vec<Vec<String>> = points
        .iter()
        .map(|obs| {
            vec![
                obs.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                obs.ticker.to_string(),
                format!("{:.2}", obs.price),
            ]
        })
        .collect();
    render_table(&["Timestamp", "Ticker", "Price"], &cells)
}

/// Which rules a saved row met, and for how many points.
pub fn score_breakdown(row: &ScreenerRow) -> String {
    let record = row.record();
    let mut lines: Vec<String> = RULES
        .iter()
        .map(|rule| {
            let raw = record.get(rule.field);
            let points = rule.apply(normalize(raw));
            let mark = if points > 0 { "+" } else { " " };
            format!(
                "{mark} {:<32} {:<16} {raw:>10}  {points:>2}",
                rule.field.label(),
                rule.condition
            )
        })
        .collect();
    lines.push(format!("{:>66}", format!("Score {}", row.score)));
    lines.join("\n")
}

/// Horizontal bars for the first `top` rows, one block per point.
pub fn score_chart(rows: &[ScreenerRow], top: usize) -> String {
    let rows = &rows[..rows.len().min(top)];
    let width = rows
        .iter()
        .map(|row| row.ticker.as_str().len())
        .max()
        .unwrap_or(0);
    rows.iter()
        .map(|row| {
            let bar = "█".repeat(row.score as usize);
            format!("{:<width$} │{bar} {}", row.ticker.as_str(), row.score)
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prices over time, oldest on the left; at most `width` points are drawn.
pub fn trend_chart(points: &[PriceObservation], width: usize, height: usize) -> String {
    let (width, height) = (width.max(2), height.max(2));
    if points.is_empty() {
        return String::new();
    }

    let prices: Vec<f64> = if points.len() > width {
        (0..width)
            .map(|i| points[i * (points.len() - 1) / (width - 1)].price)
            .collect()
    } else {
        points.iter().map(|obs| obs.price).collect()
    };

    let (low, high) = prices
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
    let span = (high - low).max(f64::EPSILON);
    let steps = (height - 1) as f64;
    let level = |price: f64| (((price - low) / span) * steps).round() as usize;

    let mut out = Vec::with_capacity(height + 2);
    for row in (0..height).rev() {
        let label = low + span * row as f64 / steps;
        let dots: String = prices
            .iter()
            .map(|p| if level(*p) == row { '●' } else { ' ' })
            .collect();
        out.push(format!("{label:>10.2} ┤{}", dots.trim_end()));
    }
    out.push(format!("{:>10} └{}", "", "─".repeat(prices.len())));

    let first = points[0].timestamp.format(TIMESTAMP_FORMAT);
    let last = points[points.len() - 1].timestamp.format(TIMESTAMP_FORMAT);
    out.push(format!("{:>12}{first} → {last}", ""));
    out.join("\n")
}
