use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("platform rejected request with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("platform unreachable: {0}")]
    Unreachable(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("gateway session closed: {0}")]
    Closed(String),

    #[error("gateway protocol error: {0}")]
    Protocol(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Unreachable(format!("request timed out: {e}"))
        } else if e.is_connect() {
            GatewayError::Unreachable(format!("connection failed: {e}"))
        } else if e.is_decode() {
            GatewayError::InvalidResponse(e.to_string())
        } else {
            GatewayError::RequestFailed(e.to_string())
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for GatewayError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        GatewayError::Closed(e.to_string())
    }
}
