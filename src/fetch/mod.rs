//! HTTP access to HAPI servers.

pub mod client;
pub mod endpoint;
pub mod error;

pub use client::{Fetcher, HapiClient};
pub use endpoint::Endpoint;
pub use error::FetchError;

use crate::merge::Fetched;

/// Fetch and validate one endpoint of the server at `base_url`.
///
/// Any failure is folded into `Fetched::Err` so callers can keep prior data.
pub fn fetch_endpoint(fetcher: &dyn Fetcher, base_url: &str, endpoint: &Endpoint) -> Fetched {
    let url = match endpoint.url(base_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(base_url, error = %e, "bad server url");
            return Fetched::Err(e.to_string());
        }
    };

    let result = fetcher
        .get_json(&url)
        .map_err(|e| e.to_string())
        .and_then(|response| endpoint.check(response));

    match result {
        Ok(record) => Fetched::Ok(record),
        Err(message) => {
            tracing::error!(%url, "{}", message);
            Fetched::Err(message)
        }
    }
}
