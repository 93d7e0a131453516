//! Gateway connection configuration.
//!
//! The browser host persists this in local storage; native callers keep it
//! wherever they like. JSON in, JSON out - there is no filesystem here.

use serde::{Deserialize, Serialize};

use crate::error::Result;

fn default_media_bucket() -> String {
    "media".to_string()
}

fn default_overlay_bucket() -> String {
    "overlays".to_string()
}

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the backend project.
    pub endpoint_url: String,

    /// Publishable (anonymous) API key.
    pub publishable_key: String,

    /// Bucket for post and merch media uploads.
    #[serde(default = "default_media_bucket")]
    pub media_bucket: String,

    /// Bucket for header overlay uploads.
    #[serde(default = "default_overlay_bucket")]
    pub overlay_bucket: String,
}

impl GatewayConfig {
    /// Create a config with the default bucket names.
    pub fn new(endpoint_url: impl Into<String>, publishable_key: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            publishable_key: publishable_key.into(),
            media_bucket: default_media_bucket(),
            overlay_bucket: default_overlay_bucket(),
        }
    }

    /// Whether both connection fields are present.
    pub fn is_configured(&self) -> bool {
        !self.endpoint_url.is_empty() && !self.publishable_key.is_empty()
    }

    /// Load config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Serialize config to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_roundtrip() {
        let config = GatewayConfig::new("https://project.example.co", "anon-key");
        let json = config.to_json().unwrap();
        let parsed = GatewayConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.media_bucket, "media");
    }

    #[test]
    fn test_missing_buckets_default() {
        let parsed = GatewayConfig::from_json(
            r#"{ "endpoint_url": "https://p.example.co", "publishable_key": "k" }"#,
        )
        .unwrap();
        assert_eq!(parsed.media_bucket, "media");
        assert_eq!(parsed.overlay_bucket, "overlays");
        assert!(parsed.is_configured());
    }

    #[test]
    fn test_is_configured() {
        assert!(!GatewayConfig::new("", "").is_configured());
        assert!(!GatewayConfig::new("https://p.example.co", "").is_configured());
    }
}
