//! Unified admin API.
//!
//! [`Admin`] wires the session gate, content cache, draft store, reconciler,
//! and toggle controller to one gateway handle, and is the entry point hosts
//! (the browser bindings, tests) drive. All state is owned here and mutated
//! through `&mut self`; the single-operator, single-logical-thread model
//! means there is no locking.

use std::sync::Arc;

use crate::cache::ContentCache;
use crate::content::{AppItem, MerchItem, Post, SiteInfo, SiteSettings};
use crate::draft::DraftStore;
use crate::error::{FbaError, Result};
use crate::event::AdminEvent;
use crate::gateway::{Collection, ContentGateway, Session};
use crate::notify::CallbackRegistry;
use crate::reconcile::{self, SaveReport};
use crate::session::SessionGate;
use crate::speculative;
use crate::{ordering, upload};

/// The admin/editing controller for one site.
pub struct Admin {
    gateway: Option<Arc<dyn ContentGateway>>,
    events: Arc<CallbackRegistry<AdminEvent>>,
    gate: SessionGate,
    /// The published view delivered to public rendering.
    pub cache: ContentCache,
    /// The operator's draft state.
    pub drafts: DraftStore,
}

impl Admin {
    /// Create a disconnected controller rendering sample content.
    pub fn new() -> Self {
        let events = Arc::new(CallbackRegistry::new());
        Self {
            gateway: None,
            gate: SessionGate::new(Arc::clone(&events)),
            events,
            cache: ContentCache::sample(),
            drafts: DraftStore::new(),
        }
    }

    /// The event registry hosts subscribe to for notices.
    pub fn events(&self) -> &Arc<CallbackRegistry<AdminEvent>> {
        &self.events
    }

    /// The session gate (read-only; transitions go through this API).
    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    /// Attach a gateway connection.
    pub fn connect(&mut self, gateway: Arc<dyn ContentGateway>) {
        self.gateway = Some(gateway);
    }

    /// Whether a gateway connection is configured.
    pub fn is_connected(&self) -> bool {
        self.gateway.is_some()
    }

    /// The gateway handle, if connected.
    pub fn gateway(&self) -> Option<&Arc<dyn ContentGateway>> {
        self.gateway.as_ref()
    }

    fn require_gateway(&self) -> Result<Arc<dyn ContentGateway>> {
        self.gateway.clone().ok_or(FbaError::GatewayUnavailable)
    }

    /// Adopt any existing session and build the initial public view.
    pub async fn initialize(&mut self) {
        if let Some(gateway) = self.gateway.clone() {
            match gateway.current_session().await {
                Ok(session) => self.gate.set_session(session),
                Err(err) => log::warn!("session lookup failed: {err}"),
            }
        }
        self.refresh_cache().await;
    }

    /// Exchange credentials for a session.
    pub async fn login(&mut self, email: &str, secret: &str) -> Result<()> {
        let gateway = self.require_gateway()?;
        let session = gateway.authenticate(email, secret).await?;
        self.gate.set_session(Some(session));
        Ok(())
    }

    /// End the session. Edit mode is forced off by the gate.
    pub async fn logout(&mut self) {
        if let Some(gateway) = self.gateway.clone() {
            // Best effort; the local session is cleared regardless.
            if let Err(err) = gateway.sign_out().await {
                log::warn!("remote sign-out failed: {err}");
            }
        }
        self.gate.set_session(None);
    }

    /// Record a session transition observed asynchronously (expiry included).
    pub fn observe_session(&mut self, session: Option<Session>) {
        self.gate.set_session(session);
    }

    /// Rebuild the public cache. Disconnected hosts get sample content.
    pub async fn refresh_cache(&mut self) {
        match self.gateway.clone() {
            Some(gateway) => {
                self.cache.refresh(gateway.as_ref()).await;
                self.events.emit(&AdminEvent::cache_refreshed());
            }
            None => {
                let settings = self.cache.settings.clone();
                self.cache = ContentCache::sample();
                self.cache.settings = settings;
            }
        }
    }

    /// React to a gateway change notification with a full public re-fetch.
    pub async fn handle_remote_change(&mut self) {
        self.refresh_cache().await;
    }

    /// Enter edit mode: requires a session, loads the full collections
    /// (hidden included), and captures the deletion-diff snapshots.
    pub async fn enter_edit_mode(&mut self) -> Result<()> {
        if !self.gate.is_logged_in() {
            return Err(FbaError::NotAuthenticated);
        }
        let gateway = self.require_gateway()?;

        self.gate.set_edit_mode(true)?;
        self.events.emit(&AdminEvent::content_loading());

        match reconcile::load_drafts(gateway.as_ref(), &mut self.drafts).await {
            Ok(()) => {
                self.events.emit(&AdminEvent::content_loaded(
                    self.drafts.posts.len(),
                    self.drafts.merch.len(),
                    self.drafts.apps.len(),
                ));
                Ok(())
            }
            Err(err) => {
                // The load is what makes edit mode usable; back out on failure.
                let _ = self.gate.set_edit_mode(false);
                Err(err)
            }
        }
    }

    /// Leave edit mode. Draft state is kept; re-entry reloads it.
    pub fn exit_edit_mode(&mut self) {
        let _ = self.gate.set_edit_mode(false);
    }

    /// Save all draft changes in one coordinated batch.
    pub async fn save(&mut self) -> Result<SaveReport> {
        if !self.drafts.is_loaded() {
            return Err(FbaError::Validation(
                "nothing to save - edit mode has not loaded content".to_string(),
            ));
        }
        let gateway = self.require_gateway()?;

        self.events.emit(&AdminEvent::save_started());
        match reconcile::save_drafts(gateway.as_ref(), &mut self.drafts).await {
            Ok(report) => {
                self.events.emit(&AdminEvent::save_completed());
                Ok(report)
            }
            Err(err) => {
                self.events.emit(&AdminEvent::save_failed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Flip an item's hidden flag optimistically.
    pub async fn toggle_hidden(&mut self, collection: Collection, id: &str) -> Result<bool> {
        let gateway = self.gateway.clone();
        let gateway = gateway.as_deref();

        let result = match collection {
            Collection::Posts => {
                speculative::toggle_hidden(gateway, &mut self.drafts.posts, id).await
            }
            Collection::Merch => {
                speculative::toggle_hidden(gateway, &mut self.drafts.merch, id).await
            }
            Collection::Apps => {
                speculative::toggle_hidden(gateway, &mut self.drafts.apps, id).await
            }
        };

        if let Err(err) = &result {
            self.events.emit(&AdminEvent::toggle_failed(
                collection.name(),
                id,
                err.to_string(),
            ));
        }
        result
    }

    /// Translate a drag gesture into a new draft ordering.
    ///
    /// Only active in edit mode; the public rendering of the same
    /// collections never reorders.
    pub fn move_item(&mut self, collection: Collection, from: usize, to: usize) -> bool {
        if !self.gate.is_edit_mode() {
            return false;
        }
        match collection {
            Collection::Posts => ordering::move_item(&mut self.drafts.posts, from, to),
            Collection::Merch => ordering::move_item(&mut self.drafts.merch, from, to),
            Collection::Apps => ordering::move_item(&mut self.drafts.apps, from, to),
        }
    }

    /// Insert or update a draft post.
    pub fn upsert_post(&mut self, post: Post) {
        self.drafts.posts.upsert(post);
    }

    /// Insert or update a draft merch item, enforcing the edit form's
    /// required fields and the legacy-image invariant.
    pub fn upsert_merch(&mut self, mut item: MerchItem) -> Result<()> {
        item.sync_legacy_image();
        item.validate()?;
        self.drafts.merch.upsert(item);
        Ok(())
    }

    /// Insert or update a draft app entry.
    pub fn upsert_app(&mut self, app: AppItem) {
        self.drafts.apps.upsert(app);
    }

    /// Replace the draft info document.
    pub fn set_info(&mut self, info: SiteInfo) {
        self.drafts.info = Some(info);
    }

    /// Remove an item from the working draft; deleted remotely at next save.
    pub fn remove_item(&mut self, collection: Collection, id: &str) -> bool {
        match collection {
            Collection::Posts => self.drafts.posts.remove(id),
            Collection::Merch => self.drafts.merch.remove(id),
            Collection::Apps => self.drafts.apps.remove(id),
        }
    }

    /// Replace the site settings, optimistically.
    pub async fn update_settings(&mut self, next: SiteSettings) -> Result<()> {
        let gateway = self.gateway.clone();
        let result =
            speculative::update_settings(gateway.as_deref(), &mut self.cache.settings, next).await;

        match &result {
            Ok(()) => self.events.emit(&AdminEvent::settings_saved()),
            Err(err) => self
                .events
                .emit(&AdminEvent::settings_save_failed(err.to_string())),
        }
        result
    }

    /// Upload a file, falling back to an inline `data:` URL when disconnected.
    pub async fn upload(
        &self,
        bucket: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        upload::upload_file(
            self.gateway.as_deref(),
            bucket,
            file_name,
            content_type,
            bytes,
        )
        .await
    }
}

impl Default for Admin {
    fn default() -> Self {
        Self::new()
    }
}
