use crate::cli::Cli;
use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;
use valu_client::endp::yahoo_finance::BASE_URL;
use valu_client::prelude::*;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Settings from `.env`, the environment & the command line (the latter wins).
///
/// `dotenv::var` reads `.env` on first use, so its values apply whether or not it was loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub user_agent: String,
    pub base_url: String,
    pub data_dir: PathBuf,
    pub concurrency: usize,
    pub field_map: Option<PathBuf>,
}

impl Config {
    pub fn from_env(cli: &Cli) -> Self {
        Self::from_vars(cli, |key| dotenv::var(key).ok())
    }

    pub(crate) fn from_vars(cli: &Cli, var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| var(key).filter(|value| !value.trim().is_empty());
        Self {
            user_agent: non_empty("USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            base_url: non_empty("VALU_BASE_URL").unwrap_or_else(|| BASE_URL.to_string()),
            data_dir: cli
                .data_dir
                .clone()
                .or_else(|| non_empty("VALU_DATA_DIR").map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(".")),
            concurrency: cli.concurrency.max(1),
            field_map: cli.field_map.clone(),
        }
    }

    /// Yahoo! Finance client, with the configured field map swapped in.
    pub async fn yahoo(&self) -> Result<YahooFinance> {
        let client = build_client(&self.user_agent)?;
        let mut yahoo = YahooFinance::new(client).with_base_url(self.base_url.as_str());
        if let Some(path) = &self.field_map {
            yahoo = yahoo.with_field_map(FieldMap::load(path).await?);
            debug!("using field map from {}", path.display());
        }
        Ok(yahoo)
    }
}
