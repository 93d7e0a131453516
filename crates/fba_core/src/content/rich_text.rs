//! Rich-text blocks and the stored merch description.
//!
//! Post and app bodies are stored as block arrays. The merch description is
//! a legacy text column that may hold either plain text or a JSON-serialized
//! block array; [`Description`] decides which once, at read time, so render
//! paths never re-parse.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// One block of rich-text content.
///
/// The `delta` variant carries the editing widget's native payload opaquely;
/// the core never inspects it beyond the blank check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RichTextBlock {
    /// A heading with an optional level (1-3).
    Heading {
        /// Heading level, when specified.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        level: Option<u8>,
        /// Heading text.
        #[serde(default)]
        content: String,
    },
    /// A paragraph of text.
    Paragraph {
        /// Paragraph text.
        #[serde(default)]
        content: String,
    },
    /// A bulleted list.
    List {
        /// List entries.
        #[serde(default)]
        items: Vec<String>,
    },
    /// An inline image.
    Image {
        /// Image URL.
        #[serde(default)]
        src: String,
        /// Alternative text, when present.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
    /// An inline video.
    Video {
        /// Video URL.
        #[serde(default)]
        src: String,
    },
    /// An embedded frame.
    Embed {
        /// Embed URL.
        #[serde(default)]
        src: String,
    },
    /// The editing widget's native delta payload, carried opaquely.
    QuillDelta {
        /// Opaque delta document.
        #[serde(default)]
        delta: Value,
    },
    /// Raw HTML carried over from rows predating block storage.
    Html {
        /// The legacy HTML fragment.
        #[serde(default)]
        html: String,
    },
}

impl RichTextBlock {
    /// Create a paragraph block.
    pub fn paragraph(content: impl Into<String>) -> Self {
        Self::Paragraph {
            content: content.into(),
        }
    }

    /// Create a heading block.
    pub fn heading(level: u8, content: impl Into<String>) -> Self {
        Self::Heading {
            level: Some(level),
            content: content.into(),
        }
    }

    /// Create a list block.
    pub fn list(items: Vec<String>) -> Self {
        Self::List { items }
    }

    /// Whether this block renders as visible content.
    ///
    /// A paragraph of whitespace or a delta whose inserts are all whitespace
    /// counts as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Heading { content, .. } | Self::Paragraph { content } => {
                content.trim().is_empty()
            }
            Self::List { items } => items.iter().all(|item| item.trim().is_empty()),
            Self::Image { src, .. } | Self::Video { src } | Self::Embed { src } => src.is_empty(),
            Self::QuillDelta { delta } => delta_is_blank(delta),
            Self::Html { html } => html.trim().is_empty(),
        }
    }
}

fn delta_is_blank(delta: &Value) -> bool {
    match delta.get("ops").and_then(Value::as_array) {
        Some(ops) => ops.iter().all(|op| {
            op.get("insert")
                .and_then(Value::as_str)
                .is_some_and(|text| text.trim().is_empty())
        }),
        None => true,
    }
}

/// The stored merch description, decoded once at read time.
///
/// The backing column predates block storage, so it may hold plain text or a
/// JSON block array. The variant is decided when the row is read and carried
/// explicitly from then on.
#[derive(Debug, Clone, PartialEq)]
pub enum Description {
    /// The column held plain (or unparseable) text.
    PlainText(String),
    /// The column held a serialized block array.
    Blocks(Vec<RichTextBlock>),
}

impl Description {
    /// Decode the stored column text.
    ///
    /// Text that fails to parse as a block array is treated as a single
    /// plain paragraph; this is the recovery path for malformed stored
    /// descriptions.
    pub fn from_stored(raw: &str) -> Self {
        if raw.trim_start().starts_with('[') {
            match serde_json::from_str::<Vec<RichTextBlock>>(raw) {
                Ok(blocks) => return Self::Blocks(blocks),
                Err(err) => {
                    log::debug!("stored description failed to parse as blocks: {err}");
                }
            }
        }
        Self::PlainText(raw.to_string())
    }

    /// Encode back to the stored column representation.
    pub fn to_stored(&self) -> String {
        match self {
            Self::PlainText(text) => text.clone(),
            Self::Blocks(blocks) => serde_json::to_string(blocks).unwrap_or_default(),
        }
    }

    /// The description as renderable blocks.
    pub fn blocks(&self) -> Vec<RichTextBlock> {
        match self {
            Self::PlainText(text) => vec![RichTextBlock::paragraph(text.clone())],
            Self::Blocks(blocks) => blocks.clone(),
        }
    }

    /// Whether the description renders as visible content.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::PlainText(text) => text.trim().is_empty(),
            Self::Blocks(blocks) => blocks.iter().all(RichTextBlock::is_blank),
        }
    }
}

impl Default for Description {
    fn default() -> Self {
        Self::PlainText(String::new())
    }
}

// The stored representation is a string column; serialize accordingly so a
// serialized MerchItem is exactly the row to upsert.
impl Serialize for Description {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_stored())
    }
}

impl<'de> Deserialize<'de> for Description {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_stored(&raw))
    }
}
