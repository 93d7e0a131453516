//! The info and settings singletons.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use super::rich_text::RichTextBlock;
use crate::error::Result;

/// The singleton info document: a rich-text body and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SiteInfo {
    /// Singleton key; always `true`.
    pub id: bool,
    /// Rich-text body of the info section.
    pub body_richtext: Vec<RichTextBlock>,
}

impl SiteInfo {
    /// Create an info document from its body.
    pub fn new(body_richtext: Vec<RichTextBlock>) -> Self {
        Self {
            id: true,
            body_richtext,
        }
    }

    /// Decode a backend row, tolerating missing columns.
    pub fn from_row(row: &Value) -> Self {
        Self {
            id: true,
            body_richtext: super::array_field(row, "body_richtext"),
        }
    }

    /// Encode this document as the row to store.
    pub fn to_row(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(Into::into)
    }
}

/// Theme colors applied to the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ThemeColors {
    /// Background color.
    pub bg: String,
    /// Foreground color.
    pub fg: String,
    /// Accent color.
    pub accent: String,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#000000".to_string(),
            fg: "#FFFFFF".to_string(),
            accent: "#E10600".to_string(),
        }
    }
}

/// Font and ticker configuration.
///
/// The ticker fields live inside the font object for compatibility with the
/// stored settings row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FontSettings {
    /// Display font family.
    pub display: String,
    /// Base font family.
    pub base: String,
    /// Ticker text, when configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    /// Ticker scroll duration in seconds.
    #[serde(
        default,
        rename = "tickerSpeed",
        skip_serializing_if = "Option::is_none"
    )]
    pub ticker_speed: Option<u32>,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            display: "Press Start 2P".to_string(),
            base: "Inter".to_string(),
            ticker: Some(String::new()),
            ticker_speed: Some(20),
        }
    }
}

/// Promo popup configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PromoSettings {
    /// Whether the popup is shown.
    pub enabled: bool,
    /// Promo image URL.
    #[serde(default)]
    pub image_url: String,
    /// Optional click-through URL.
    #[serde(default)]
    pub link_url: String,
}

/// Overlay animation effect kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    /// Falling snow.
    #[default]
    Snow,
    /// Falling leaves.
    Leaves,
    /// Confetti.
    Confetti,
}

/// Overlay animation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OverlayAnimation {
    /// Whether the overlay is shown.
    pub enabled: bool,
    /// Which effect to render.
    #[serde(rename = "type")]
    pub kind: OverlayKind,
}

/// Tile density presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Density {
    /// Small tiles.
    S,
    /// Medium tiles.
    #[default]
    M,
    /// Large tiles.
    L,
}

/// The singleton site settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SiteSettings {
    /// Singleton key; always `true`.
    #[serde(default = "default_singleton_id")]
    pub id: bool,
    /// Theme colors.
    #[serde(default)]
    pub colors: ThemeColors,
    /// Font and ticker configuration.
    #[serde(default)]
    pub fonts: FontSettings,
    /// Promo popup configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo: Option<PromoSettings>,
    /// Overlay animation configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_animation: Option<OverlayAnimation>,
    /// Optional header overlay image URL.
    #[serde(default)]
    pub header_overlay_url: Option<String>,
    /// Tile density.
    #[serde(default)]
    pub density: Density,
}

fn default_singleton_id() -> bool {
    true
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            id: true,
            colors: ThemeColors::default(),
            fonts: FontSettings::default(),
            promo: Some(PromoSettings::default()),
            overlay_animation: Some(OverlayAnimation::default()),
            header_overlay_url: None,
            density: Density::M,
        }
    }
}

impl SiteSettings {
    /// Decode a backend row, falling back to defaults on a malformed row.
    pub fn from_row(row: &Value) -> Self {
        serde_json::from_value(row.clone()).unwrap_or_else(|err| {
            log::warn!("malformed site_settings row, using defaults: {err}");
            Self::default()
        })
    }

    /// Encode these settings as the row to store.
    pub fn to_row(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(Into::into)
    }
}
