use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, WatchlistAction};
use config::Config;
use dotenv::dotenv;
use tracing::{debug, subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;
use valu_warehouse::history;
use valu_warehouse::prelude::*;
use valu_warehouse::prices::sort_live_prices;

mod cli;
mod config;
mod ui;

const CHART_WIDTH: usize = 60;
const CHART_HEIGHT: usize = 12;
const CHART_TOP: usize = 5;

fn preprocess(trace_level: Level) {
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .with_writer(std::io::stderr)
        .finish();
    subscriber::set_global_default(my_subscriber).expect("Set subscriber");
}

#[tokio::main]
async fn main() -> Result<()> {
    // `.env` before clap, so its values reach the `env` fallbacks
    dotenv().ok();
    let cli = Cli::parse();

    preprocess(cli.trace.into());
    trace!("Command line input recorded: {cli:#?}");

    let config = Config::from_env(&cli);
    debug!("Configuration: {config:?}");

    run(&cli, &config).await
}

async fn run(cli: &Cli, config: &Config) -> Result<()> {
    std::fs::create_dir_all(&config.data_dir)?;

    ////////////////////////////////////////////////////////////////////////////////////////////////////

    // cli framework:
    // "> valu <COMMAND>"
    match &cli.command {
        // "> valu screen [TICKERS]"
        // score tickers on their fundamentals & save the ranking
        Commands::Screen { tickers } => screen(config, tickers).await?,

        // "> valu details [TICKER]"
        // saved fundamentals of one screened ticker
        Commands::Details { ticker } => details(config, ticker.as_deref())?,

        // "> valu watchlist [add remove prices]"
        Commands::Watchlist { action } => {
            // both files exist before either is read
            let store = WatchlistStore::open(&config.data_dir)?;
            HistoryStore::open(&config.data_dir)?;

            match action {
                // ---------------------------------------------------------------------------
                // "> valu watchlist add <TICKER> [--note TEXT]"
                WatchlistAction::Add { ticker, note } => match store.add(ticker, note)? {
                    AddOutcome::Added(t) => ui::success(format!("Added {t} to watchlist!")),
                    AddOutcome::Duplicate(t) => {
                        ui::warning(format!("{t} is already in your watchlist."))
                    }
                    AddOutcome::Rejected(e) => ui::failure(format!("Please enter a ticker: {e}")),
                },

                // ---------------------------------------------------------------------------
                // "> valu watchlist remove [TICKER]"
                WatchlistAction::Remove { ticker } => {
                    let watchlist = store.load()?;
                    if watchlist.is_empty() {
                        ui::warning("Your watchlist is empty. Add some stocks!");
                        return Ok(());
                    }

                    let ticker = match ticker {
                        Some(ticker) => ticker.clone(),
                        None => {
                            let tickers: Vec<&Ticker> = watchlist.tickers().collect();
                            let i = ui::select("Select a stock to remove", &tickers)?;
                            tickers[i].to_string()
                        }
                    };

                    match store.remove(&ticker)? {
                        RemoveOutcome::Removed(entry) => {
                            ui::success(format!("Removed {} from watchlist!", entry.ticker))
                        }
                        RemoveOutcome::NotFound(t) => {
                            ui::warning(format!("{t} is not in your watchlist."))
                        }
                    }
                }

                // ---------------------------------------------------------------------------
                // "> valu watchlist prices [--sort ticker|price]"
                // fetch live prices & append them to the price history
                WatchlistAction::Prices { sort } => {
                    let watchlist = store.load()?;
                    if watchlist.is_empty() {
                        ui::warning("Your watchlist is empty. Add some stocks!");
                        return Ok(());
                    }
                    prices(config, &watchlist, (*sort).into()).await?;
                }
            }
        }

        // "> valu trend [TICKER]"
        // chart the recorded prices of one ticker
        Commands::Trend { ticker } => trend(config, ticker.as_deref())?,
    }

    Ok(())
}

/// A ticker typed on the command line; unusable input is reported, not raised.
fn ticker_arg(raw: &str) -> Option<Ticker> {
    match Ticker::parse(raw) {
        Ok(ticker) => Some(ticker),
        Err(e) => {
            ui::failure(format!("Please enter a valid ticker: {e}"));
            None
        }
    }
}

async fn screen(config: &Config, input: &str) -> Result<()> {
    let tickers = Ticker::parse_list(input);
    if tickers.is_empty() {
        ui::failure("Please enter at least one ticker.");
        return Ok(());
    }

    let yahoo = config.yahoo().await?;
    let pb = ui::single_pb(tickers.len() as u64);
    let tracked = ui::Tracked::new(&yahoo, pb.clone());
    let store = ScreenerStore::new(&config.data_dir);
    let mut cache = FundamentalsCache::new();

    let outcome = Screener::new(&tracked)
        .concurrency(config.concurrency)
        .run(&tickers, &mut cache, &store)
        .await?;
    pb.finish_and_clear();

    match outcome {
        ScreenerOutcome::Empty => ui::failure("No data retrieved."),
        ScreenerOutcome::Ranked(rows) => {
            ui::success("Analysis completed!");
            ui::heading("Stock Screener Results");
            println!("{}", ui::screener_table(&rows));
            ui::heading(format!("Top {CHART_TOP} Stocks by Score"));
            println!("{}", ui::score_chart(&rows, CHART_TOP));
        }
    }
    Ok(())
}

fn details(config: &Config, ticker: Option<&str>) -> Result<()> {
    let Some(rows) = ScreenerStore::new(&config.data_dir).load()? else {
        ui::warning("No saved data found. Please run the screener first!");
        return Ok(());
    };
    if rows.is_empty() {
        ui::warning("No saved data found. Please run the screener first!");
        return Ok(());
    }
    ui::success("Loaded saved screener data!");

    let row = match ticker {
        Some(raw) => {
            let Some(ticker) = ticker_arg(raw) else {
                return Ok(());
            };
            match rows.iter().find(|row| row.ticker == ticker) {
                Some(row) => row,
                None => {
                    ui::warning(format!("{ticker} is not in the saved screener data."));
                    return Ok(());
                }
            }
        }
        None => {
            let tickers: Vec<&Ticker> = rows.iter().map(|row| &row.ticker).collect();
            &rows[ui::select("Select a stock for detailed view", &tickers)?]
        }
    };

    ui::heading(format!("{} Fundamentals", row.ticker));
    println!("{}", ui::screener_table(std::slice::from_ref(row)));
    println!();
    println!("{}", ui::score_breakdown(row));
    Ok(())
}

async fn prices(config: &Config, watchlist: &Watchlist, sort: PriceSort) -> Result<()> {
    let yahoo = config.yahoo().await?;
    let pb = ui::single_pb(watchlist.len() as u64);
    let tracked = ui::Tracked::new(&yahoo, pb.clone());
    let history = HistoryStore::open(&config.data_dir)?;

    let mut refresh = PriceRefresher::new(&tracked)
        .concurrency(config.concurrency)
        .refresh(watchlist, &history)
        .await?;
    pb.finish_and_clear();

    if refresh.appended.is_empty() {
        ui::failure("No prices retrieved.");
    } else {
        ui::info(format!(
            "Recorded {} of {} prices.",
            refresh.appended.len(),
            watchlist.len()
        ));
    }

    sort_live_prices(&mut refresh.live, sort);
    ui::heading("Watchlist");
    println!("{}", ui::live_prices_table(&refresh.live));
    Ok(())
}

fn trend(config: &Config, ticker: Option<&str>) -> Result<()> {
    const REFRESH_FIRST: &str =
        "No price history found. Run `valu watchlist prices` to record some first!";

    let observations = HistoryStore::at(&config.data_dir)
        .load_existing()?
        .unwrap_or_default();
    let by_ticker = history::group_by_ticker(&observations);
    if by_ticker.is_empty() {
        ui::warning(REFRESH_FIRST);
        return Ok(());
    }

    let ticker = match ticker {
        Some(raw) => match ticker_arg(raw) {
            Some(ticker) => ticker,
            None => return Ok(()),
        },
        None => {
            let tickers: Vec<&Ticker> = by_ticker.keys().collect();
            tickers[ui::select("Select a stock", &tickers)?].clone()
        }
    };

    let points = history::trend(&observations, &ticker);
    if points.is_empty() {
        ui::warning(format!("No prices recorded for {ticker}. {REFRESH_FIRST}"));
        return Ok(());
    }

    ui::heading(format!("{ticker} Price Trend"));
    println!("{}", ui::trend_chart(&points, CHART_WIDTH, CHART_HEIGHT));
    println!();
    println!("{}", ui::history_table(&points));
    Ok(())
}
