/// Errors from a single HAPI request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Network, DNS, TLS or timeout failure.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    HttpStatus { status: u16, url: String },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{url} did not return a JSON object")]
    NotAnObject { url: String },
}

impl FetchError {
    /// Worth another attempt: transport problems and server-side errors.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request(_) => true,
            FetchError::HttpStatus { status, .. } => *status >= 500,
            FetchError::Json(_) | FetchError::NotAnObject { .. } => false,
        }
    }
}
