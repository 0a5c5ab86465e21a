use reqwest::StatusCode;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("HTTP error! Status: {}", .0.as_u16())]
    Status(StatusCode),
    #[error("Server is not responding")]
    ServerNotResponding(StatusCode),
    #[error("Invalid server url: {0}")]
    InvalidServer(String),

    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Url parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("Serde json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Short reason suited for a transfer failure message: the status text of a non-2xx
    /// answer, `Network error` when the request never completed.
    pub fn status_text(&self) -> String {
        match self {
            ClientError::Status(status) | ClientError::ServerNotResponding(status) => status
                .canonical_reason()
                .map(ToString::to_string)
                .unwrap_or_else(|| status.as_str().to_string()),
            ClientError::Reqwest(err) if err.is_connect() || err.is_timeout() || err.is_request() => {
                "Network error".to_string()
            }
            other => other.to_string(),
        }
    }
}
