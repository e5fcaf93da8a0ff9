use reqwest::{Client, StatusCode};
use std::future::Future;
use tracing::{error, trace};
use valu_warehouse::api::FetchError;

pub trait ClientExt {
    fn get_page(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Add-on methods for [`reqwest::Client`].
///
/// [`reqwest::Client`]: https://docs.rs/reqwest/latest/reqwest/struct.Client.html
impl ClientExt for Client {
    /// GET `url` and return the body of a `200 OK` response.
    async fn get_page(&self, url: &str) -> Result<String, FetchError> {
        trace!("GET {url}");
        let response = self.get(url).send().await.map_err(|e| {
            error!("failed fetching response from {url}: {e}");
            FetchError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| {
            error!("failed reading response body from {url}: {e}");
            FetchError::Transport(e.to_string())
        })
    }
}
