//! Abstraction over the hosted backend.
//!
//! This module provides the [`ContentGateway`] trait the rest of the crate
//! talks through: data queries, authentication, file storage, and the
//! change-notification feed. Concrete implementations live outside the core
//! (a native REST client, a JavaScript-backed gateway in the browser, mocks
//! in tests).
//!
//! ## Object safety
//!
//! `ContentGateway` is designed to be object-safe so it can be used behind
//! `dyn ContentGateway`. To enable this, all async methods return boxed
//! futures.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::error::Result;
use crate::notify::SubscriptionId;

/// A boxed future for object-safe async methods.
///
/// On native targets, futures are `Send` for compatibility with multi-threaded
/// runtimes. On WASM, there's no `Send` requirement since JavaScript is
/// single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A boxed future for object-safe async methods.
///
/// WASM version without `Send` requirement - JavaScript is single-threaded.
#[cfg(target_arch = "wasm32")]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Name of the singleton collection holding the info document.
pub const SITE_INFO: &str = "site_info";

/// Name of the singleton collection holding the site settings.
pub const SITE_SETTINGS: &str = "site_settings";

/// The three orderable content collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// The feed of posts.
    Posts,
    /// Merch items.
    Merch,
    /// App entries.
    Apps,
}

impl Collection {
    /// All orderable collections, in section order.
    pub const ALL: [Collection; 3] = [Collection::Posts, Collection::Merch, Collection::Apps];

    /// The collection name as stored in the backend.
    pub fn name(self) -> &'static str {
        match self {
            Collection::Posts => "posts",
            Collection::Merch => "merch",
            Collection::Apps => "apps",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which rows a collection query should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only rows with `hidden = false` (public rendering).
    PublicOnly,
    /// Every row, hidden included (edit-mode loading).
    All,
}

/// An authenticated session with the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Session {
    /// Bearer token for authenticated calls.
    pub access_token: String,
    /// Identifier of the authenticated user.
    pub user_id: String,
    /// Email address of the authenticated user, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Unix timestamp at which the session expires, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// A change notification from the gateway.
///
/// The only payload guarantee is "something in the public schema changed";
/// the collection hint is best-effort and may be absent.
#[derive(Debug, Clone, Default)]
pub struct ChangeEvent {
    /// Collection name the change was observed on, if the feed knows it.
    pub collection: Option<String>,
}

/// Callback invoked on gateway change notifications.
#[cfg(not(target_arch = "wasm32"))]
pub type ChangeCallback = std::sync::Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Callback invoked on gateway change notifications (WASM, no `Send`).
#[cfg(target_arch = "wasm32")]
pub type ChangeCallback = std::sync::Arc<dyn Fn(&ChangeEvent)>;

/// The hosted backend, as seen by the core.
///
/// Rows travel as [`serde_json::Value`] and are decoded tolerantly by the
/// content model; upserts are keyed by the `id` column, so the caller never
/// distinguishes insert from update. All operations are non-blocking;
/// timeout behavior is whatever the underlying client does by default.
#[cfg(not(target_arch = "wasm32"))]
pub trait ContentGateway: Send + Sync {
    /// Query a collection, ordered ascending by order rank.
    fn query_collection<'a>(
        &'a self,
        collection: Collection,
        visibility: Visibility,
    ) -> BoxFuture<'a, Result<Vec<Value>>>;

    /// Fetch a singleton document, if present.
    fn get_singleton<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Option<Value>>>;

    /// Insert-or-update every row, keyed by `id`.
    fn upsert_many<'a>(
        &'a self,
        collection: Collection,
        rows: Vec<Value>,
    ) -> BoxFuture<'a, Result<()>>;

    /// Delete the rows with the given identifiers.
    fn delete_many<'a>(
        &'a self,
        collection: Collection,
        ids: Vec<String>,
    ) -> BoxFuture<'a, Result<()>>;

    /// Apply a partial update to a single row.
    ///
    /// This is the optimistic-toggle path: one item, one field, no full
    /// save cycle.
    fn update_item<'a>(
        &'a self,
        collection: Collection,
        id: &'a str,
        patch: Value,
    ) -> BoxFuture<'a, Result<()>>;

    /// Replace the contents of a singleton document.
    fn update_singleton<'a>(&'a self, name: &'a str, row: Value) -> BoxFuture<'a, Result<()>>;

    /// Exchange credentials for a session.
    fn authenticate<'a>(
        &'a self,
        email: &'a str,
        secret: &'a str,
    ) -> BoxFuture<'a, Result<Session>>;

    /// The current session, if one exists.
    fn current_session<'a>(&'a self) -> BoxFuture<'a, Result<Option<Session>>>;

    /// End the current session. Best effort; local state is cleared regardless.
    fn sign_out<'a>(&'a self) -> BoxFuture<'a, Result<()>>;

    /// Subscribe to change notifications for the public schema.
    fn subscribe_changes(&self, callback: ChangeCallback) -> SubscriptionId;

    /// Remove a change subscription.
    fn unsubscribe_changes(&self, id: SubscriptionId);

    /// Upload an object and return its public URL.
    fn upload_object<'a>(
        &'a self,
        bucket: &'a str,
        path: &'a str,
        content_type: &'a str,
        bytes: Vec<u8>,
    ) -> BoxFuture<'a, Result<String>>;
}

/// The hosted backend, as seen by the core (WASM version).
///
/// Identical to the native trait but without the `Send + Sync` requirement,
/// since JavaScript-backed implementations hold `!Send` handles.
#[cfg(target_arch = "wasm32")]
pub trait ContentGateway {
    /// Query a collection, ordered ascending by order rank.
    fn query_collection<'a>(
        &'a self,
        collection: Collection,
        visibility: Visibility,
    ) -> BoxFuture<'a, Result<Vec<Value>>>;

    /// Fetch a singleton document, if present.
    fn get_singleton<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Option<Value>>>;

    /// Insert-or-update every row, keyed by `id`.
    fn upsert_many<'a>(
        &'a self,
        collection: Collection,
        rows: Vec<Value>,
    ) -> BoxFuture<'a, Result<()>>;

    /// Delete the rows with the given identifiers.
    fn delete_many<'a>(
        &'a self,
        collection: Collection,
        ids: Vec<String>,
    ) -> BoxFuture<'a, Result<()>>;

    /// Apply a partial update to a single row.
    fn update_item<'a>(
        &'a self,
        collection: Collection,
        id: &'a str,
        patch: Value,
    ) -> BoxFuture<'a, Result<()>>;

    /// Replace the contents of a singleton document.
    fn update_singleton<'a>(&'a self, name: &'a str, row: Value) -> BoxFuture<'a, Result<()>>;

    /// Exchange credentials for a session.
    fn authenticate<'a>(
        &'a self,
        email: &'a str,
        secret: &'a str,
    ) -> BoxFuture<'a, Result<Session>>;

    /// The current session, if one exists.
    fn current_session<'a>(&'a self) -> BoxFuture<'a, Result<Option<Session>>>;

    /// End the current session. Best effort; local state is cleared regardless.
    fn sign_out<'a>(&'a self) -> BoxFuture<'a, Result<()>>;

    /// Subscribe to change notifications for the public schema.
    fn subscribe_changes(&self, callback: ChangeCallback) -> SubscriptionId;

    /// Remove a change subscription.
    fn unsubscribe_changes(&self, id: SubscriptionId);

    /// Upload an object and return its public URL.
    fn upload_object<'a>(
        &'a self,
        bucket: &'a str,
        path: &'a str,
        content_type: &'a str,
        bytes: Vec<u8>,
    ) -> BoxFuture<'a, Result<String>>;
}
