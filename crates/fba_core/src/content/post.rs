//! Feed posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use super::rich_text::RichTextBlock;
use super::{ContentRecord, ExternalLink, NEW_ITEM_RANK};
use crate::gateway::Collection;

/// Kind of media shown in a post header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// A still image.
    Image,
    /// An animated GIF.
    Gif,
    /// A video clip.
    Video,
}

impl MediaKind {
    /// Infer the media kind from a URL when the stored kind is absent.
    pub fn infer(url: &str) -> Self {
        let lower = url.to_ascii_lowercase();
        let path = lower.split('?').next().unwrap_or(&lower);
        if path.ends_with(".gif") {
            Self::Gif
        } else if [".mp4", ".webm", ".mov"].iter().any(|ext| path.ends_with(ext)) {
            Self::Video
        } else {
            Self::Image
        }
    }
}

/// A post in the feed section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Post {
    /// Unique identifier.
    pub id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Post title.
    pub title: String,
    /// Header media URL.
    pub header_media_url: String,
    /// Header media kind.
    pub header_media_type: MediaKind,
    /// Rich-text body.
    pub body_richtext: Vec<RichTextBlock>,
    /// External links shown under the body.
    pub external_links: Vec<ExternalLink>,
    /// Hidden from public rendering.
    pub hidden: bool,
    /// Order rank within the feed.
    pub order_index: i64,
}

impl Post {
    /// Create a fresh draft post: new identifier, hidden, prepend rank.
    pub fn new_draft() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            title: "New Post".to_string(),
            header_media_url: String::new(),
            header_media_type: MediaKind::Image,
            body_richtext: Vec::new(),
            external_links: Vec::new(),
            hidden: true,
            order_index: NEW_ITEM_RANK,
        }
    }
}

impl ContentRecord for Post {
    const COLLECTION: Collection = Collection::Posts;

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
        &self.title
    }

    fn from_row(row: &Value) -> Self {
        // Older rows store the header under `cover_url` and the body as a
        // single HTML fragment in `body_html`.
        let header_media_url = match super::opt_str_field(row, "header_media_url") {
            Some(url) => url,
            None => super::str_field(row, "cover_url"),
        };

        let header_media_type = row
            .get("header_media_type")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_else(|| MediaKind::infer(&header_media_url));

        let mut body_richtext: Vec<RichTextBlock> = super::array_field(row, "body_richtext");
        if body_richtext.is_empty()
            && let Some(html) = super::opt_str_field(row, "body_html")
        {
            body_richtext = vec![RichTextBlock::Html { html }];
        }

        Self {
            id: super::id_field(row),
            created_at: super::timestamp_field(row, "created_at"),
            title: super::str_field(row, "title"),
            header_media_url,
            header_media_type,
            body_richtext,
            external_links: super::array_field(row, "external_links"),
            hidden: super::bool_field(row, "hidden"),
            order_index: super::rank_field(row, "order_index"),
        }
    }
}
