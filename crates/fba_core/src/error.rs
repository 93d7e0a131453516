use serde::Serialize;
use thiserror::Error;

/// Unified error type for FBA operations
#[derive(Debug, Error)]
pub enum FbaError {
    // Session errors
    #[error("Not authenticated. Log in before entering edit mode.")]
    NotAuthenticated,

    // Gateway errors
    #[error("No gateway connection configured")]
    GatewayUnavailable,

    #[error("Remote operation failed: {0}")]
    Remote(String),

    /// Aggregated failure from the batched save. Partial successes among
    /// the batch are not rolled back; the operator retries the whole save.
    #[error("Save failed: {0}")]
    SaveFailed(String),

    // Content errors
    #[error("Invalid price '{0}'. Enter a non-negative decimal amount like '12.50'")]
    InvalidPrice(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No item with id '{id}' in {collection}")]
    UnknownItem {
        collection: &'static str,
        id: String,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for FBA operations
pub type Result<T> = std::result::Result<T, FbaError>;

/// A serializable representation of FbaError for the WASM/IPC boundary
#[derive(Debug, Clone, Serialize)]
pub struct SerializableError {
    /// Error kind/variant name
    pub kind: String,
    /// Human-readable error message
    pub message: String,
}

impl From<&FbaError> for SerializableError {
    fn from(err: &FbaError) -> Self {
        let kind = match err {
            FbaError::NotAuthenticated => "NotAuthenticated",
            FbaError::GatewayUnavailable => "GatewayUnavailable",
            FbaError::Remote(_) => "Remote",
            FbaError::SaveFailed(_) => "SaveFailed",
            FbaError::InvalidPrice(_) => "InvalidPrice",
            FbaError::Validation(_) => "Validation",
            FbaError::UnknownItem { .. } => "UnknownItem",
            FbaError::Json(_) => "Json",
        }
        .to_string();

        Self {
            kind,
            message: err.to_string(),
        }
    }
}

impl From<FbaError> for SerializableError {
    fn from(err: FbaError) -> Self {
        SerializableError::from(&err)
    }
}

impl FbaError {
    /// Convert to a serializable representation for IPC
    pub fn to_serializable(&self) -> SerializableError {
        SerializableError::from(self)
    }
}
