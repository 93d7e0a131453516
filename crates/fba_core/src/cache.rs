//! The published-content cache.
//!
//! Holds the public view of all four collections plus the site settings.
//! Rebuilds are wholesale: any change notification triggers a full re-fetch
//! of the public view, never an incremental patch, so the cache is always
//! rebuildable from a fresh read and merely eventually consistent with an
//! in-flight save. Hidden items never enter the cache - the gateway filters
//! them server-side and the decode path drops any that slip through.

use serde::Serialize;
use serde_json::Value;
use ts_rs::TS;

use crate::content::{
    AppItem, ContentRecord, MerchItem, Post, SiteInfo, SiteSettings, sample,
};
use crate::error::Result;
use crate::gateway::{Collection, ContentGateway, SITE_INFO, SITE_SETTINGS, Visibility};

/// The published view delivered to public rendering.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ContentCache {
    /// Visible posts, in rank order.
    pub posts: Vec<Post>,
    /// Visible merch items, in rank order.
    pub merch: Vec<MerchItem>,
    /// Visible app entries, in rank order.
    pub apps: Vec<AppItem>,
    /// The info document.
    pub site_info: SiteInfo,
    /// The site settings.
    pub settings: SiteSettings,
    /// Whether a refresh is in flight.
    pub loading: bool,
}

impl ContentCache {
    /// A cache filled with the bundled placeholder content.
    pub fn sample() -> Self {
        Self {
            posts: sample::posts(),
            merch: sample::merch(),
            apps: sample::apps(),
            site_info: sample::site_info(),
            settings: SiteSettings::default(),
            loading: false,
        }
    }

    /// Rebuild the cache wholesale from the gateway's public view.
    ///
    /// The five reads are issued concurrently. A collection whose read fails
    /// falls back to the bundled sample content rather than going blank;
    /// a missing or unreadable settings row falls back to defaults.
    pub async fn refresh(&mut self, gateway: &dyn ContentGateway) {
        self.loading = true;

        let (posts, merch, apps, info, settings) = futures_util::join!(
            gateway.query_collection(Collection::Posts, Visibility::PublicOnly),
            gateway.query_collection(Collection::Merch, Visibility::PublicOnly),
            gateway.query_collection(Collection::Apps, Visibility::PublicOnly),
            gateway.get_singleton(SITE_INFO),
            gateway.get_singleton(SITE_SETTINGS),
        );

        self.posts = decode_visible(posts, sample::posts);
        self.merch = decode_visible(merch, sample::merch);
        self.apps = decode_visible(apps, sample::apps);

        self.site_info = match info {
            Ok(Some(row)) => SiteInfo::from_row(&row),
            Ok(None) => sample::site_info(),
            Err(err) => {
                log::warn!("info read failed, using sample content: {err}");
                sample::site_info()
            }
        };

        self.settings = match settings {
            Ok(Some(row)) => SiteSettings::from_row(&row),
            Ok(None) => SiteSettings::default(),
            Err(err) => {
                log::warn!("settings read failed, using defaults: {err}");
                SiteSettings::default()
            }
        };

        self.loading = false;
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::sample()
    }
}

/// Decode a public collection read, dropping hidden rows and falling back to
/// sample content when the read failed.
fn decode_visible<T: ContentRecord>(
    result: Result<Vec<Value>>,
    fallback: fn() -> Vec<T>,
) -> Vec<T> {
    match result {
        Ok(rows) => rows
            .iter()
            .map(T::from_row)
            .filter(|record| !record.hidden())
            .collect(),
        Err(err) => {
            log::warn!(
                "{} read failed, using sample content: {err}",
                T::COLLECTION
            );
            fallback()
        }
    }
}
