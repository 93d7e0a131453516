//! Exported admin API.
//!
//! The controller lives in thread-local state, mirroring the single-operator
//! model: async entry points take it out for the duration of the operation
//! and put it back when done, so overlapping admin calls fail fast instead
//! of interleaving.

use std::cell::RefCell;
use std::sync::Arc;

use wasm_bindgen::prelude::*;

use fba_core::admin::Admin;
use fba_core::content::{AppItem, MerchItem, Post, SiteInfo, SiteSettings, merch};
use fba_core::event::AdminEvent;
use fba_core::gateway::{Collection, Session};

use crate::error::IntoJsResult;
use crate::js_gateway::JsGateway;

thread_local! {
    static ADMIN: RefCell<Option<Admin>> = RefCell::new(Some(Admin::new()));
}

fn take_admin() -> Result<Admin, JsValue> {
    ADMIN
        .with(|cell| cell.borrow_mut().take())
        .ok_or_else(|| JsValue::from_str("another admin operation is in flight"))
}

fn restore_admin(admin: Admin) {
    ADMIN.with(|cell| *cell.borrow_mut() = Some(admin));
}

fn with_admin<R>(f: impl FnOnce(&mut Admin) -> R) -> Result<R, JsValue> {
    ADMIN.with(|cell| {
        let mut slot = cell.borrow_mut();
        let admin = slot
            .as_mut()
            .ok_or_else(|| JsValue::from_str("another admin operation is in flight"))?;
        Ok(f(admin))
    })
}

fn parse_collection(name: &str) -> Result<Collection, JsValue> {
    match name {
        "posts" => Ok(Collection::Posts),
        "merch" => Ok(Collection::Merch),
        "apps" => Ok(Collection::Apps),
        other => Err(JsValue::from_str(&format!("unknown collection '{other}'"))),
    }
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|err| JsValue::from_str(&format!("invalid {what}: {err}")))
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

// ============================================================================
// Connection & session
// ============================================================================

/// Attach a JavaScript-backed gateway (see `JsGateway` for the callback
/// shape).
#[wasm_bindgen]
pub fn connect_gateway(callbacks: JsValue) -> Result<(), JsValue> {
    with_admin(|admin| admin.connect(Arc::new(JsGateway::new(callbacks))))
}

/// Whether a gateway connection is configured.
#[wasm_bindgen]
pub fn is_connected() -> Result<bool, JsValue> {
    with_admin(|admin| admin.is_connected())
}

/// Adopt any existing session and build the initial public view.
#[wasm_bindgen]
pub async fn initialize() -> Result<(), JsValue> {
    let mut admin = take_admin()?;
    admin.initialize().await;
    restore_admin(admin);
    Ok(())
}

/// Log in with email and password.
#[wasm_bindgen]
pub async fn login(email: String, secret: String) -> Result<(), JsValue> {
    let mut admin = take_admin()?;
    let result = admin.login(&email, &secret).await;
    restore_admin(admin);
    result.js_err()
}

/// Log out. Edit mode is forced off as a side effect.
#[wasm_bindgen]
pub async fn logout() -> Result<(), JsValue> {
    let mut admin = take_admin()?;
    admin.logout().await;
    restore_admin(admin);
    Ok(())
}

/// Record a session transition observed by the JS auth listener.
/// Pass `null` on sign-out or expiry.
#[wasm_bindgen]
pub fn observe_session(session: JsValue) -> Result<(), JsValue> {
    let session: Option<Session> = if session.is_null() || session.is_undefined() {
        None
    } else {
        Some(from_js(session, "session")?)
    };
    with_admin(|admin| admin.observe_session(session))
}

/// Whether an authenticated session exists.
#[wasm_bindgen]
pub fn is_logged_in() -> Result<bool, JsValue> {
    with_admin(|admin| admin.gate().is_logged_in())
}

// ============================================================================
// Public content
// ============================================================================

/// Rebuild the public content cache from the gateway.
#[wasm_bindgen]
pub async fn refresh_content() -> Result<(), JsValue> {
    let mut admin = take_admin()?;
    admin.refresh_cache().await;
    restore_admin(admin);
    Ok(())
}

/// React to a realtime change notification with a full public re-fetch.
#[wasm_bindgen]
pub async fn notify_remote_change() -> Result<(), JsValue> {
    let mut admin = take_admin()?;
    admin.handle_remote_change().await;
    restore_admin(admin);
    Ok(())
}

/// Snapshot of the published view (posts, merch, apps, info, settings).
#[wasm_bindgen]
pub fn public_content() -> Result<JsValue, JsValue> {
    with_admin(|admin| to_js(&admin.cache))?
}

// ============================================================================
// Edit mode & drafts
// ============================================================================

/// Enter edit mode. Requires a session; loads the full collections.
#[wasm_bindgen]
pub async fn enter_edit_mode() -> Result<(), JsValue> {
    let mut admin = take_admin()?;
    let result = admin.enter_edit_mode().await;
    restore_admin(admin);
    result.js_err()
}

/// Leave edit mode.
#[wasm_bindgen]
pub fn exit_edit_mode() -> Result<(), JsValue> {
    with_admin(|admin| admin.exit_edit_mode())
}

/// Whether edit mode is active.
#[wasm_bindgen]
pub fn is_edit_mode() -> Result<bool, JsValue> {
    with_admin(|admin| admin.gate().is_edit_mode())
}

/// Snapshot of the draft state (posts, merch, apps, info).
#[wasm_bindgen]
pub fn draft_content() -> Result<JsValue, JsValue> {
    with_admin(|admin| {
        to_js(&serde_json::json!({
            "posts": admin.drafts.posts.items(),
            "merch": admin.drafts.merch.items(),
            "apps": admin.drafts.apps.items(),
            "info": admin.drafts.info,
        }))
    })?
}

/// Save all draft changes in one batch. Returns a `SaveReport`.
#[wasm_bindgen]
pub async fn save_changes() -> Result<JsValue, JsValue> {
    let mut admin = take_admin()?;
    let result = admin.save().await;
    restore_admin(admin);
    let report = result.js_err()?;
    to_js(&report)
}

/// Flip an item's hidden flag optimistically. Returns the new value.
#[wasm_bindgen]
pub async fn toggle_hidden(collection: String, id: String) -> Result<bool, JsValue> {
    let collection = parse_collection(&collection)?;
    let mut admin = take_admin()?;
    let result = admin.toggle_hidden(collection, &id).await;
    restore_admin(admin);
    result.js_err()
}

/// Apply a drag gesture to a draft list. Returns whether anything moved.
#[wasm_bindgen]
pub fn move_item(collection: String, from: usize, to: usize) -> Result<bool, JsValue> {
    let collection = parse_collection(&collection)?;
    with_admin(|admin| admin.move_item(collection, from, to))
}

/// Insert or update a draft post.
#[wasm_bindgen]
pub fn upsert_post(post: JsValue) -> Result<(), JsValue> {
    let post: Post = from_js(post, "post")?;
    with_admin(|admin| admin.upsert_post(post))
}

/// Insert or update a draft merch item (validates required fields).
#[wasm_bindgen]
pub fn upsert_merch(item: JsValue) -> Result<(), JsValue> {
    let item: MerchItem = from_js(item, "merch item")?;
    with_admin(|admin| admin.upsert_merch(item))?.js_err()
}

/// Insert or update a draft app entry.
#[wasm_bindgen]
pub fn upsert_app(app: JsValue) -> Result<(), JsValue> {
    let app: AppItem = from_js(app, "app")?;
    with_admin(|admin| admin.upsert_app(app))
}

/// Replace the draft info document.
#[wasm_bindgen]
pub fn set_info(info: JsValue) -> Result<(), JsValue> {
    let info: SiteInfo = from_js(info, "site info")?;
    with_admin(|admin| admin.set_info(info))
}

/// Remove an item from the working draft.
#[wasm_bindgen]
pub fn remove_item(collection: String, id: String) -> Result<bool, JsValue> {
    let collection = parse_collection(&collection)?;
    with_admin(|admin| admin.remove_item(collection, &id))
}

/// A fresh draft post (new id, hidden, prepend rank).
#[wasm_bindgen]
pub fn new_draft_post() -> Result<JsValue, JsValue> {
    to_js(&Post::new_draft())
}

/// A fresh draft merch item.
#[wasm_bindgen]
pub fn new_draft_merch() -> Result<JsValue, JsValue> {
    to_js(&MerchItem::new_draft())
}

/// A fresh draft app entry.
#[wasm_bindgen]
pub fn new_draft_app() -> Result<JsValue, JsValue> {
    to_js(&AppItem::new_draft())
}

// ============================================================================
// Settings & uploads
// ============================================================================

/// Replace the site settings, optimistically.
#[wasm_bindgen]
pub async fn update_settings(settings: JsValue) -> Result<(), JsValue> {
    let settings: SiteSettings = from_js(settings, "settings")?;
    let mut admin = take_admin()?;
    let result = admin.update_settings(settings).await;
    restore_admin(admin);
    result.js_err()
}

/// Upload a file; returns a public URL, or an inline `data:` URL when
/// disconnected.
#[wasm_bindgen]
pub async fn upload_file(
    bucket: String,
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
) -> Result<String, JsValue> {
    let admin = take_admin()?;
    let result = admin.upload(&bucket, &file_name, &content_type, bytes).await;
    restore_admin(admin);
    result.js_err()
}

// ============================================================================
// Prices & events
// ============================================================================

/// Parse an operator-entered decimal price into minor units.
#[wasm_bindgen]
pub fn parse_price(input: String) -> Result<f64, JsValue> {
    merch::parse_price(&input).map(|cents| cents as f64).js_err()
}

/// Format minor units for display ("12.50").
#[wasm_bindgen]
pub fn format_price(cents: f64) -> String {
    merch::format_price(cents as i64)
}

/// Subscribe a JS callback to admin events. Returns a subscription id.
#[wasm_bindgen]
pub fn subscribe_events(callback: js_sys::Function) -> Result<f64, JsValue> {
    with_admin(|admin| {
        admin.events().subscribe(Arc::new(move |event: &AdminEvent| {
            if let Ok(value) = serde_wasm_bindgen::to_value(event) {
                let _ = callback.call1(&JsValue::NULL, &value);
            }
        })) as f64
    })
}

/// Remove an event subscription.
#[wasm_bindgen]
pub fn unsubscribe_events(id: f64) -> Result<bool, JsValue> {
    with_admin(|admin| admin.events().unsubscribe(id as u64))
}
