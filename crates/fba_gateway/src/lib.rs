//! Native gateway client for FBA.
//!
//! [`RestGateway`] implements the core's `ContentGateway` trait against the
//! hosted backend: the REST data API for collections and singletons,
//! password-grant authentication, object storage uploads, and a WebSocket
//! change feed for the public schema.
//!
//! # Example
//!
//! ```ignore
//! use fba_core::admin::Admin;
//! use fba_core::config::GatewayConfig;
//! use fba_gateway::RestGateway;
//! use std::sync::Arc;
//!
//! let config = GatewayConfig::new("https://project.example.co", "publishable-key");
//! let gateway = Arc::new(RestGateway::new(config)?);
//! gateway.spawn_change_feed();
//!
//! let mut admin = Admin::new();
//! admin.connect(gateway);
//! admin.initialize().await;
//! ```

mod error;
mod realtime;
mod rest;

pub use error::{GatewayError, Result};
pub use rest::RestGateway;
