//! Admin events surfaced to the hosting UI.
//!
//! This module defines the events emitted by the admin/editing layer. They
//! are the boundary where the host renders toasts or updates chrome; the
//! core itself never prints. Events are delivered through a
//! [`CallbackRegistry`](crate::notify::CallbackRegistry).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Events emitted by admin and editing operations.
///
/// Every remote failure the operator should see arrives here as an event;
/// none propagate as faults into the rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "type")]
pub enum AdminEvent {
    /// Edit mode was switched on or off.
    EditModeChanged {
        /// Whether edit mode is now active.
        active: bool,
    },

    /// The session state changed (login, logout, or observed expiry).
    SessionChanged {
        /// Whether an authenticated session now exists.
        logged_in: bool,
    },

    /// The full content load for edit mode started.
    ContentLoading,

    /// The full content load for edit mode finished.
    ContentLoaded {
        /// Number of posts loaded into the draft store.
        posts: usize,
        /// Number of merch items loaded into the draft store.
        merch: usize,
        /// Number of apps loaded into the draft store.
        apps: usize,
    },

    /// The public content cache was rebuilt from a fresh read.
    CacheRefreshed,

    /// A save of all draft changes started.
    SaveStarted,

    /// A save of all draft changes completed successfully.
    SaveCompleted,

    /// A save failed; partial successes among the batch are not rolled back.
    SaveFailed {
        /// Aggregated failure description.
        reason: String,
    },

    /// An optimistic visibility toggle failed and was rolled back.
    ToggleFailed {
        /// Collection the item belongs to.
        collection: String,
        /// Identifier of the item whose flip was reverted.
        id: String,
        /// Failure description.
        reason: String,
    },

    /// Site settings were saved remotely.
    SettingsSaved,

    /// A settings update failed and the local copy was restored.
    SettingsSaveFailed {
        /// Failure description.
        reason: String,
    },
}

impl AdminEvent {
    /// Create an EditModeChanged event.
    pub fn edit_mode_changed(active: bool) -> Self {
        Self::EditModeChanged { active }
    }

    /// Create a SessionChanged event.
    pub fn session_changed(logged_in: bool) -> Self {
        Self::SessionChanged { logged_in }
    }

    /// Create a ContentLoading event.
    pub fn content_loading() -> Self {
        Self::ContentLoading
    }

    /// Create a ContentLoaded event.
    pub fn content_loaded(posts: usize, merch: usize, apps: usize) -> Self {
        Self::ContentLoaded { posts, merch, apps }
    }

    /// Create a CacheRefreshed event.
    pub fn cache_refreshed() -> Self {
        Self::CacheRefreshed
    }

    /// Create a SaveStarted event.
    pub fn save_started() -> Self {
        Self::SaveStarted
    }

    /// Create a SaveCompleted event.
    pub fn save_completed() -> Self {
        Self::SaveCompleted
    }

    /// Create a SaveFailed event.
    pub fn save_failed(reason: impl Into<String>) -> Self {
        Self::SaveFailed {
            reason: reason.into(),
        }
    }

    /// Create a ToggleFailed event.
    pub fn toggle_failed(
        collection: impl Into<String>,
        id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ToggleFailed {
            collection: collection.into(),
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a SettingsSaved event.
    pub fn settings_saved() -> Self {
        Self::SettingsSaved
    }

    /// Create a SettingsSaveFailed event.
    pub fn settings_save_failed(reason: impl Into<String>) -> Self {
        Self::SettingsSaveFailed {
            reason: reason.into(),
        }
    }

    /// Get the event type as a string.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::EditModeChanged { .. } => "EditModeChanged",
            Self::SessionChanged { .. } => "SessionChanged",
            Self::ContentLoading => "ContentLoading",
            Self::ContentLoaded { .. } => "ContentLoaded",
            Self::CacheRefreshed => "CacheRefreshed",
            Self::SaveStarted => "SaveStarted",
            Self::SaveCompleted => "SaveCompleted",
            Self::SaveFailed { .. } => "SaveFailed",
            Self::ToggleFailed { .. } => "ToggleFailed",
            Self::SettingsSaved => "SettingsSaved",
            Self::SettingsSaveFailed { .. } => "SettingsSaveFailed",
        }
    }
}
