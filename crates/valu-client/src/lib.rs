pub mod client_ext;
pub mod endp;
pub mod field_map;

pub mod prelude {
    pub use crate::client_ext::ClientExt;
    pub use crate::endp::yahoo_finance::YahooFinance;
    pub use crate::field_map::{FieldMap, FieldMapError};
    #[allow(unused_imports)]
    pub use reqwest::Client;

    /// Every page is requested with this `User-Agent`; Yahoo! rejects requests without one.
    pub fn build_client(user_agent: &str) -> anyhow::Result<Client> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(user_agent)
            .build()?;
        Ok(client)
    }
}
