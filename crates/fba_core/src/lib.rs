#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Unified admin API
pub mod admin;

/// Published-content cache
pub mod cache;

/// Gateway connection configuration
pub mod config;

/// Content model (posts, merch, apps, singletons)
pub mod content;

/// Draft store (working copies + deletion-diff snapshots)
pub mod draft;

/// Error (common error types)
pub mod error;

/// Admin events surfaced to the hosting UI
pub mod event;

/// Gateway trait (the hosted backend boundary)
pub mod gateway;

/// Callback registry for event subscriptions
pub mod notify;

/// Ordering engine (drag gesture to draft reorder)
pub mod ordering;

/// Reconciler (the coordinated save routine)
pub mod reconcile;

/// Session gate (auth-conditional edit mode)
pub mod session;

/// Speculative single-item mutations
pub mod speculative;

/// File upload with inline fallback
pub mod upload;

#[cfg(test)]
pub mod test_support;
