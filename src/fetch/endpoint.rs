use crate::record::{self, Record};
use anyhow::Context;
use reqwest::Url;
use serde_json::Value;

/// HAPI status code for a successful request.
pub const HAPI_OK: i64 = 1200;

/// HAPI metadata endpoints this tool harvests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    About,
    Catalog,
    Capabilities,
    Info(String),
}

impl Endpoint {
    /// Path segment, also used as the state directory name.
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::About => "about",
            Endpoint::Catalog => "catalog",
            Endpoint::Capabilities => "capabilities",
            Endpoint::Info(_) => "info",
        }
    }

    /// Key a valid response must contain.
    pub fn required_key(&self) -> Option<&'static str> {
        match self {
            Endpoint::About => None,
            Endpoint::Catalog => Some("catalog"),
            Endpoint::Capabilities => Some("outputFormats"),
            Endpoint::Info(_) => Some("parameters"),
        }
    }

    pub fn url(&self, base_url: &str) -> anyhow::Result<String> {
        let raw = format!("{}/{}", base_url.trim_end_matches('/'), self.name());
        let mut url = Url::parse(&raw).with_context(|| format!("invalid server url {}", base_url))?;
        if let Endpoint::Info(id) = self {
            url.query_pairs_mut().append_pair("id", id);
        }
        Ok(url.to_string())
    }

    /// Reject responses that carry a HAPI error status or lack the
    /// endpoint's payload node.
    pub fn check(&self, response: Record) -> Result<Record, String> {
        if let Some(code) = record::get_path(&response, &["status", "code"]).and_then(status_code) {
            if code != HAPI_OK {
                let message = record::get_path(&response, &["status", "message"])
                    .and_then(Value::as_str)
                    .unwrap_or("");
                return Err(format!("HAPI status {} {}", code, message).trim_end().to_string());
            }
        }
        if let Some(key) = self.required_key() {
            if !response.contains_key(key) {
                return Err(format!("No {} node in JSON response.", key));
            }
        }
        Ok(response)
    }
}

fn status_code(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
