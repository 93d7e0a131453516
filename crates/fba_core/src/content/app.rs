//! App entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use super::rich_text::RichTextBlock;
use super::{ContentRecord, ExternalLink, NEW_ITEM_RANK};
use crate::gateway::Collection;

/// An entry in the apps section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AppItem {
    /// Unique identifier.
    pub id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// App name.
    pub name: String,
    /// Icon URL.
    pub icon_url: String,
    /// Short description shown on the tile.
    pub short_desc: String,
    /// Rich-text body shown when the tile is opened.
    pub body_richtext: Vec<RichTextBlock>,
    /// External links shown under the body.
    pub links: Vec<ExternalLink>,
    /// Hidden from public rendering.
    pub hidden: bool,
    /// Order rank within the apps section.
    pub order_index: i64,
}

impl AppItem {
    /// Create a fresh draft entry: new identifier, hidden, prepend rank.
    pub fn new_draft() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            name: "New App".to_string(),
            icon_url: String::new(),
            short_desc: String::new(),
            body_richtext: Vec::new(),
            links: Vec::new(),
            hidden: true,
            order_index: NEW_ITEM_RANK,
        }
    }
}

impl ContentRecord for AppItem {
    const COLLECTION: Collection = Collection::Apps;

    fn id(&self) -> &str {
        &self.id
    }

    fn hidden(&self) -> bool {
        self.hidden
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    fn order_rank(&self) -> i64 {
        self.order_index
    }

    fn set_order_rank(&mut self, rank: i64) {
        self.order_index = rank;
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn from_row(row: &Value) -> Self {
        Self {
            id: super::id_field(row),
            created_at: super::timestamp_field(row, "created_at"),
            name: super::str_field(row, "name"),
            icon_url: super::str_field(row, "icon_url"),
            short_desc: super::str_field(row, "short_desc"),
            body_richtext: super::array_field(row, "body_richtext"),
            links: super::array_field(row, "links"),
            hidden: super::bool_field(row, "hidden"),
            order_index: super::rank_field(row, "order_index"),
        }
    }
}
