//! In-memory gateway used by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use serde_json::Value;

use crate::error::{FbaError, Result};
use crate::gateway::{
    BoxFuture, ChangeCallback, ChangeEvent, Collection, ContentGateway, Session, Visibility,
};
use crate::notify::{CallbackRegistry, SubscriptionId};

/// Mutable state behind the mock gateway.
#[derive(Default)]
pub struct GatewayState {
    /// Rows per collection, keyed by collection name.
    pub collections: HashMap<&'static str, Vec<Value>>,
    /// Singleton rows by name.
    pub singletons: HashMap<String, Value>,
    /// The session `current_session` reports.
    pub session: Option<Session>,
    /// Operation labels forced to fail, e.g. `"upsert:posts"` or `"update_item"`.
    pub fail_ops: HashSet<String>,
    /// Labels of every remote call issued, in order.
    pub calls: Vec<String>,
}

/// An in-memory `ContentGateway` with per-operation failure injection.
#[derive(Default)]
pub struct MemoryGateway {
    /// Shared mutable gateway state.
    pub state: Mutex<GatewayState>,
    changes: CallbackRegistry<ChangeEvent>,
}

impl MemoryGateway {
    /// Create an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the labelled operation to fail.
    pub fn fail_op(&self, label: &str) {
        self.state.lock().unwrap().fail_ops.insert(label.to_string());
    }

    /// Stop failing the labelled operation.
    pub fn clear_failure(&self, label: &str) {
        self.state.lock().unwrap().fail_ops.remove(label);
    }

    /// Labels of the calls issued so far.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Rows currently stored for a collection.
    pub fn rows(&self, collection: Collection) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .collections
            .get(collection.name())
            .cloned()
            .unwrap_or_default()
    }

    /// Seed a collection with rows.
    pub fn seed(&self, collection: Collection, rows: Vec<Value>) {
        self.state
            .lock()
            .unwrap()
            .collections
            .insert(collection.name(), rows);
    }

    /// Seed a singleton row.
    pub fn seed_singleton(&self, name: &str, row: Value) {
        self.state
            .lock()
            .unwrap()
            .singletons
            .insert(name.to_string(), row);
    }

    /// Emit a change notification to subscribers.
    pub fn emit_change(&self, collection: Option<&str>) {
        self.changes.emit(&ChangeEvent {
            collection: collection.map(String::from),
        });
    }

    fn check(&self, label: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(label.to_string());
        if state.fail_ops.contains(label) {
            return Err(FbaError::Remote(format!("forced failure: {label}")));
        }
        Ok(())
    }
}

fn row_id(row: &Value) -> String {
    row.get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn row_rank(row: &Value) -> i64 {
    row.get("order_index").and_then(Value::as_i64).unwrap_or(0)
}

impl ContentGateway for MemoryGateway {
    fn query_collection<'a>(
        &'a self,
        collection: Collection,
        visibility: Visibility,
    ) -> BoxFuture<'a, Result<Vec<Value>>> {
        Box::pin(async move {
            self.check(&format!("query:{collection}"))?;
            let state = self.state.lock().unwrap();
            let mut rows: Vec<Value> = state
                .collections
                .get(collection.name())
                .cloned()
                .unwrap_or_default();
            if visibility == Visibility::PublicOnly {
                rows.retain(|row| !row.get("hidden").and_then(Value::as_bool).unwrap_or(false));
            }
            rows.sort_by_key(row_rank);
            Ok(rows)
        })
    }

    fn get_singleton<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Option<Value>>> {
        Box::pin(async move {
            self.check(&format!("singleton:{name}"))?;
            Ok(self.state.lock().unwrap().singletons.get(name).cloned())
        })
    }

    fn upsert_many<'a>(
        &'a self,
        collection: Collection,
        rows: Vec<Value>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.check(&format!("upsert:{collection}"))?;
            let mut state = self.state.lock().unwrap();
            let stored = state.collections.entry(collection.name()).or_default();
            for row in rows {
                let id = row_id(&row);
                match stored.iter_mut().find(|existing| row_id(existing) == id) {
                    Some(existing) => *existing = row,
                    None => stored.push(row),
                }
            }
            Ok(())
        })
    }

    fn delete_many<'a>(
        &'a self,
        collection: Collection,
        ids: Vec<String>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.check(&format!("delete:{collection}"))?;
            let mut state = self.state.lock().unwrap();
            if let Some(stored) = state.collections.get_mut(collection.name()) {
                stored.retain(|row| !ids.contains(&row_id(row)));
            }
            Ok(())
        })
    }

    fn update_item<'a>(
        &'a self,
        collection: Collection,
        id: &'a str,
        patch: Value,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.check("update_item")?;
            let mut state = self.state.lock().unwrap();
            let stored = state.collections.entry(collection.name()).or_default();
            let row = stored
                .iter_mut()
                .find(|row| row_id(row) == id)
                .ok_or_else(|| FbaError::Remote(format!("no row {id}")))?;
            if let (Some(target), Value::Object(fields)) = (row.as_object_mut(), patch) {
                for (key, value) in fields {
                    target.insert(key, value);
                }
            }
            Ok(())
        })
    }

    fn update_singleton<'a>(&'a self, name: &'a str, row: Value) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.check(&format!("update_singleton:{name}"))?;
            self.state
                .lock()
                .unwrap()
                .singletons
                .insert(name.to_string(), row);
            Ok(())
        })
    }

    fn authenticate<'a>(
        &'a self,
        email: &'a str,
        secret: &'a str,
    ) -> BoxFuture<'a, Result<Session>> {
        Box::pin(async move {
            self.check("authenticate")?;
            if email == "op@example.com" && secret == "secret" {
                let session = Session {
                    access_token: "test-token".to_string(),
                    user_id: "user-1".to_string(),
                    email: Some(email.to_string()),
                    expires_at: None,
                };
                self.state.lock().unwrap().session = Some(session.clone());
                Ok(session)
            } else {
                Err(FbaError::Remote("invalid credentials".to_string()))
            }
        })
    }

    fn current_session<'a>(&'a self) -> BoxFuture<'a, Result<Option<Session>>> {
        Box::pin(async move { Ok(self.state.lock().unwrap().session.clone()) })
    }

    fn sign_out<'a>(&'a self) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.state.lock().unwrap().session = None;
            Ok(())
        })
    }

    fn subscribe_changes(&self, callback: ChangeCallback) -> SubscriptionId {
        self.changes.subscribe(callback)
    }

    fn unsubscribe_changes(&self, id: SubscriptionId) {
        self.changes.unsubscribe(id);
    }

    fn upload_object<'a>(
        &'a self,
        bucket: &'a str,
        path: &'a str,
        _content_type: &'a str,
        _bytes: Vec<u8>,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            self.check("upload")?;
            Ok(format!("https://cdn.example/{bucket}/{path}"))
        })
    }
}
