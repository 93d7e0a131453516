use fba_core::error::FbaError;
use thiserror::Error;

/// Errors from the native gateway client.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid gateway URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("gateway returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("malformed gateway response: {0}")]
    Response(String),
}

/// Result type alias for gateway client operations
pub type Result<T> = std::result::Result<T, GatewayError>;

// The core sees every client failure as a remote operation failure.
impl From<GatewayError> for FbaError {
    fn from(err: GatewayError) -> Self {
        FbaError::Remote(err.to_string())
    }
}
