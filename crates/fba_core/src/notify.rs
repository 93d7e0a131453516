//! Callback registry for event subscriptions.
//!
//! This module provides a thread-safe registry for managing event callbacks.
//! It backs both the admin event stream ([`AdminEvent`](crate::event::AdminEvent))
//! and the gateway change feed, and replaces the original site's bare global
//! listener set with an explicit subscribe/notify container that is injected
//! where it is needed.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// A unique identifier for a subscription.
pub type SubscriptionId = u64;

/// Callback function type for events.
///
/// On native targets callbacks are `Send + Sync` for compatibility with
/// multi-threaded hosts. On WASM there is no `Send` requirement since
/// JavaScript is single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub type Callback<E> = std::sync::Arc<dyn Fn(&E) + Send + Sync>;

/// Callback function type for events (WASM version without `Send`).
#[cfg(target_arch = "wasm32")]
pub type Callback<E> = std::sync::Arc<dyn Fn(&E)>;

/// Thread-safe registry for managing event subscriptions.
///
/// The registry supports:
/// - Subscribing to events with unique IDs
/// - Unsubscribing by ID
/// - Emitting events to all active subscribers
pub struct CallbackRegistry<E> {
    /// Map of subscription IDs to callbacks.
    callbacks: RwLock<HashMap<SubscriptionId, Callback<E>>>,
    /// Counter for generating unique subscription IDs.
    next_id: AtomicU64,
}

impl<E> CallbackRegistry<E> {
    /// Create a new empty callback registry.
    pub fn new() -> Self {
        Self {
            callbacks: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Subscribe to events.
    ///
    /// Returns a subscription ID that can be used to unsubscribe later.
    pub fn subscribe(&self, callback: Callback<E>) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut callbacks = self.callbacks.write().unwrap();
        callbacks.insert(id, callback);
        id
    }

    /// Unsubscribe from events.
    ///
    /// Returns `true` if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut callbacks = self.callbacks.write().unwrap();
        callbacks.remove(&id).is_some()
    }

    /// Emit an event to all registered callbacks.
    ///
    /// Callbacks are invoked synchronously in an undefined order.
    /// If a callback panics, it does not affect other callbacks.
    pub fn emit(&self, event: &E) {
        let callbacks = self.callbacks.read().unwrap();
        for callback in callbacks.values() {
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                callback(event);
            }));
        }
    }

    /// Get the number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        let callbacks = self.callbacks.read().unwrap();
        callbacks.len()
    }

    /// Check if there are any active subscriptions.
    pub fn has_subscribers(&self) -> bool {
        let callbacks = self.callbacks.read().unwrap();
        !callbacks.is_empty()
    }

    /// Clear all subscriptions.
    pub fn clear(&self) {
        let mut callbacks = self.callbacks.write().unwrap();
        callbacks.clear();
    }
}

impl<E> Default for CallbackRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for CallbackRegistry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let callbacks = self.callbacks.read().unwrap();
        f.debug_struct("CallbackRegistry")
            .field("subscriber_count", &callbacks.len())
            .field("next_id", &self.next_id.load(Ordering::SeqCst))
            .finish()
    }
}
