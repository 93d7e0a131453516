//! Content model for the four public sections.
//!
//! Records mirror the backend's column names so that serializing a record
//! yields the row to upsert. Reads go through the tolerant `from_row`
//! constructors, which accept rows with missing, null, or legacy-named
//! columns rather than failing the whole collection.

/// App entries.
pub mod app;
/// Merch items and price handling.
pub mod merch;
/// Feed posts and header media.
pub mod post;
/// Rich-text blocks and the merch description variant.
pub mod rich_text;
/// Bundled placeholder content for disconnected mode.
pub mod sample;
/// The info and settings singletons.
pub mod site;

pub use app::AppItem;
pub use merch::{MerchItem, format_price, parse_price};
pub use post::{MediaKind, Post};
pub use rich_text::{Description, RichTextBlock};
pub use site::{
    Density, FontSettings, OverlayAnimation, OverlayKind, PromoSettings, SiteInfo, SiteSettings,
    ThemeColors,
};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::error::Result;
use crate::gateway::Collection;

/// Order rank assigned to rows whose stored rank is missing or malformed.
/// Large so that unranked rows sort after everything ranked.
pub const DEFAULT_RANK: i64 = 1_000;

/// Order rank carried by freshly created draft items. The value is never
/// persisted as-is; saving stamps every rank from list position.
pub const NEW_ITEM_RANK: i64 = -1;

/// An external link attached to a post or app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ExternalLink {
    /// Link label shown to visitors.
    pub label: String,
    /// Target URL.
    pub url: String,
}

/// A record belonging to one of the orderable collections.
///
/// The draft store, reconciler, and toggle controller are generic over this
/// trait; each operation works identically for posts, merch, and apps.
pub trait ContentRecord: Clone + Serialize + DeserializeOwned + 'static {
    /// The collection this record type lives in.
    const COLLECTION: Collection;

    /// Unique identifier (client-generated UUID for new items).
    fn id(&self) -> &str;

    /// Whether the record is hidden from public rendering.
    fn hidden(&self) -> bool;

    /// Set the hidden flag.
    fn set_hidden(&mut self, hidden: bool);

    /// Stored order rank.
    fn order_rank(&self) -> i64;

    /// Set the order rank. Done for every item at save time.
    fn set_order_rank(&mut self, rank: i64);

    /// Human-readable name for notices ("title" or "name" depending on type).
    fn display_name(&self) -> &str;

    /// Decode a backend row, tolerating missing and legacy columns.
    fn from_row(row: &Value) -> Self;

    /// Encode this record as the row to upsert.
    fn to_row(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(Into::into)
    }
}

// ============================================================================
// Row decoding helpers
// ============================================================================

pub(crate) fn str_field(row: &Value, key: &str) -> String {
    row.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub(crate) fn opt_str_field(row: &Value, key: &str) -> Option<String> {
    row.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

pub(crate) fn bool_field(row: &Value, key: &str) -> bool {
    row.get(key).and_then(Value::as_bool).unwrap_or(false)
}

pub(crate) fn rank_field(row: &Value, key: &str) -> i64 {
    row.get(key).and_then(Value::as_i64).unwrap_or(DEFAULT_RANK)
}

/// Decode an id column, minting a fresh identifier if the row lacks one.
pub(crate) fn id_field(row: &Value) -> String {
    match row.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => uuid::Uuid::new_v4().to_string(),
    }
}

/// Decode a timestamp column, falling back to the current time.
pub(crate) fn timestamp_field(row: &Value, key: &str) -> DateTime<Utc> {
    row.get(key)
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
        .unwrap_or_else(Utc::now)
}

/// Parse a backend timestamp. The data API emits RFC 3339; older rows may
/// lack the offset suffix.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Decode an array column element-by-element, skipping entries that fail to
/// decode instead of dropping the whole column.
pub(crate) fn array_field<T: DeserializeOwned>(row: &Value, key: &str) -> Vec<T> {
    match row.get(key) {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
            .collect(),
        _ => Vec::new(),
    }
}
