//! Merch items.
//!
//! Prices are stored in integer minor units. Images are a one-to-many array
//! with a legacy single-image column kept equal to the array's first element
//! for rows written before the array existed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use super::rich_text::Description;
use super::{ContentRecord, NEW_ITEM_RANK};
use crate::error::{FbaError, Result};
use crate::gateway::Collection;

/// Parse an operator-entered decimal price into minor currency units.
///
/// `"12.5"` parses to `1250`. Negative and non-numeric input is rejected.
pub fn parse_price(input: &str) -> Result<i64> {
    let trimmed = input.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| FbaError::InvalidPrice(input.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(FbaError::InvalidPrice(input.to_string()));
    }
    Ok((value * 100.0).round() as i64)
}

/// Format minor currency units for display: `1250` formats as `"12.50"`.
pub fn format_price(cents: i64) -> String {
    format!("{:.2}", cents as f64 / 100.0)
}

/// A merch item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MerchItem {
    /// Unique identifier.
    pub id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Item name.
    pub name: String,
    /// Legacy single-image column; always equals `image_urls[0]`.
    pub image_url: String,
    /// All item images, first element primary.
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Price in minor currency units.
    pub price_cents: i64,
    /// Currency code.
    pub currency: String,
    /// Item description; plain text or rich blocks, decided at read time.
    #[ts(type = "string")]
    pub description: Description,
    /// External purchase URL.
    pub external_url: String,
    /// Custom call-to-action label, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    /// Hidden from public rendering.
    pub hidden: bool,
    /// Order rank within the merch section.
    pub order_index: i64,
}

impl MerchItem {
    /// Create a fresh draft item: new identifier, hidden, prepend rank.
    pub fn new_draft() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            name: "New Merch".to_string(),
            image_url: String::new(),
            image_urls: Vec::new(),
            price_cents: 0,
            currency: "USD".to_string(),
            description: Description::default(),
            external_url: String::new(),
            button_text: None,
            hidden: true,
            order_index: NEW_ITEM_RANK,
        }
    }

    /// Replace the image array, keeping the legacy column in sync.
    pub fn set_images(&mut self, images: Vec<String>) {
        self.image_url = images.first().cloned().unwrap_or_default();
        self.image_urls = images;
    }

    /// Append an image, keeping the legacy column in sync.
    pub fn push_image(&mut self, url: impl Into<String>) {
        let mut images = std::mem::take(&mut self.image_urls);
        images.push(url.into());
        self.set_images(images);
    }

    /// Remove the image at `index`, keeping the legacy column in sync.
    pub fn remove_image(&mut self, index: usize) {
        let mut images = std::mem::take(&mut self.image_urls);
        if index < images.len() {
            images.remove(index);
        }
        self.set_images(images);
    }

    /// Re-establish the legacy-column invariant before persisting.
    ///
    /// Rows written before the array column existed carry only `image_url`.
    pub fn sync_legacy_image(&mut self) {
        if self.image_urls.is_empty() && !self.image_url.is_empty() {
            self.image_urls = vec![self.image_url.clone()];
        }
        self.image_url = self.image_urls.first().cloned().unwrap_or_default();
    }

    /// Validate the fields the edit form requires before accepting an upsert.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FbaError::Validation("name is required".to_string()));
        }
        if self.image_urls.is_empty() && self.image_url.is_empty() {
            return Err(FbaError::Validation(
                "at least one image is required".to_string(),
            ));
        }
        if self.price_cents < 0 {
            return Err(FbaError::Validation("price cannot be negative".to_string()));
        }
        Ok(())
    }
}

impl ContentRecord for MerchItem {
    const COLLECTION: Collection = Collection::Merch;

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
        let mut item = Self {
            id: super::id_field(row),
            created_at: super::timestamp_field(row, "created_at"),
            name: super::str_field(row, "name"),
            image_url: super::str_field(row, "image_url"),
            image_urls: super::array_field(row, "image_urls"),
            price_cents: row.get("price_cents").and_then(Value::as_i64).unwrap_or(0),
            currency: super::opt_str_field(row, "currency").unwrap_or_else(|| "USD".to_string()),
            description: Description::from_stored(&super::str_field(row, "description")),
            external_url: super::str_field(row, "external_url"),
            button_text: super::opt_str_field(row, "button_text"),
            hidden: super::bool_field(row, "hidden"),
            order_index: super::rank_field(row, "order_index"),
        };
        item.sync_legacy_image();
        item
    }
}
