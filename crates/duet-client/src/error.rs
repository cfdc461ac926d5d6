use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success answer from the server, with its `error` message.
    #[error("server returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("pair cache I/O failed: {0}")]
    Cache(#[from] std::io::Error),

    #[error("pair cache is corrupt: {0}")]
    CacheFormat(#[from] serde_json::Error),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}
