use super::error::FetchError;
use crate::record::Record;
use std::time::Duration;

/// Backoff before retry `n` is `RETRY_BASE * 2^n`.
const RETRY_BASE: Duration = Duration::from_secs(1);

const BOT_URL: &str =
    "https://github.com/hapi-server/data-specification/wiki/hapi-bots.md#hapibot-mirror";

pub fn user_agent() -> String {
    format!("hapibot-mirror/{}; {}", env!("CARGO_PKG_VERSION"), BOT_URL)
}

/// Source of JSON documents. Shared by all workers of a job.
pub trait Fetcher: Send + Sync {
    fn get_json(&self, url: &str) -> Result<Record, FetchError>;
}

/// Blocking HTTP client for HAPI servers.
pub struct HapiClient {
    client: reqwest::blocking::Client,
    retries: usize,
    retry_base: Duration,
}

impl HapiClient {
    pub fn new(timeout: Duration, retries: usize) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent())
            .build()?;
        Ok(Self {
            client,
            retries,
            retry_base: RETRY_BASE,
        })
    }

    /// Override the backoff base (tests use zero).
    pub fn with_retry_base(mut self, base: Duration) -> Self {
        self.retry_base = base;
        self
    }

    fn try_get(&self, url: &str) -> Result<Record, FetchError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let text = response.text()?;
        match serde_json::from_str(&text)? {
            serde_json::Value::Object(map) => Ok(map),
            _ => Err(FetchError::NotAnObject {
                url: url.to_string(),
            }),
        }
    }
}

impl Fetcher for HapiClient {
    fn get_json(&self, url: &str) -> Result<Record, FetchError> {
        tracing::info!(%url, "getting");
        let mut attempt = 0;
        loop {
            match self.try_get(url) {
                Ok(record) => {
                    tracing::debug!(%url, "got");
                    return Ok(record);
                }
                Err(e) if e.is_transient() && attempt < self.retries => {
                    let delay = self.retry_base * 2u32.pow(attempt as u32);
                    tracing::warn!(
                        attempt = attempt + 1,
                        %url,
                        error = %e,
                        "request failed, retrying in {:?}",
                        delay
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
