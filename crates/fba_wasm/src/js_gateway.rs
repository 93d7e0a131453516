//! JavaScript-backed ContentGateway implementation.
//!
//! This module provides [`JsGateway`], which implements the core's
//! `ContentGateway` trait by delegating every operation to JavaScript
//! callbacks returning Promises. The web frontend supplies its own backend
//! client while the Rust side drives the editing model.
//!
//! ## Usage from JavaScript
//!
//! ```javascript
//! import { connect_gateway } from './wasm/fba_wasm.js';
//!
//! connect_gateway({
//!   queryCollection: async (collection, publicOnly) => { ... return rows; },
//!   getSingleton: async (name) => { ... return row or null; },
//!   upsertMany: async (collection, rows) => { ... },
//!   deleteMany: async (collection, ids) => { ... },
//!   updateItem: async (collection, id, patch) => { ... },
//!   updateSingleton: async (name, row) => { ... },
//!   authenticate: async (email, secret) => { ... return session; },
//!   currentSession: async () => { ... return session or null; },
//!   signOut: async () => { ... },
//!   uploadObject: async (bucket, path, contentType, bytes) => { ... return url; },
//! });
//! ```

use js_sys::{Function, Promise, Uint8Array};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use fba_core::error::{FbaError, Result};
use fba_core::gateway::{
    BoxFuture, ChangeCallback, ChangeEvent, Collection, ContentGateway, Session, Visibility,
};
use fba_core::notify::{CallbackRegistry, SubscriptionId};

use crate::error::js_error_message;

/// A `ContentGateway` implementation backed by JavaScript callbacks.
///
/// Designed for single-threaded WASM: the callbacks object is held as a
/// `JsValue` and every operation resolves the named callback, invokes it,
/// and awaits the returned Promise.
pub struct JsGateway {
    callbacks: JsValue,
    changes: CallbackRegistry<ChangeEvent>,
}

impl JsGateway {
    /// Create a gateway from a callbacks object.
    pub fn new(callbacks: JsValue) -> Self {
        Self {
            callbacks,
            changes: CallbackRegistry::new(),
        }
    }

    /// Forward a change notification from the JS realtime channel to
    /// Rust-side subscribers.
    pub fn emit_change(&self, collection: Option<String>) {
        self.changes.emit(&ChangeEvent { collection });
    }

    fn callback(&self, name: &str) -> Result<Function> {
        js_sys::Reflect::get(&self.callbacks, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
            .ok_or_else(|| FbaError::Remote(format!("gateway callback '{name}' not provided")))
    }

    async fn call(&self, name: &str, args: &[JsValue]) -> Result<JsValue> {
        let callback = self.callback(name)?;
        let this = JsValue::NULL;
        let result = match args {
            [] => callback.call0(&this),
            [a] => callback.call1(&this, a),
            [a, b] => callback.call2(&this, a, b),
            [a, b, c] => callback.call3(&this, a, b, c),
            _ => {
                let js_args = js_sys::Array::new();
                for arg in args {
                    js_args.push(arg);
                }
                callback.apply(&this, &js_args)
            }
        }
        .map_err(|err| FbaError::Remote(js_error_message(err)))?;

        if result.has_type::<Promise>() {
            JsFuture::from(Promise::from(result))
                .await
                .map_err(|err| FbaError::Remote(js_error_message(err)))
        } else {
            Ok(result)
        }
    }
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|err| FbaError::Remote(format!("argument conversion failed: {err}")))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|err| FbaError::Remote(format!("response conversion failed: {err}")))
}

impl ContentGateway for JsGateway {
    fn query_collection<'a>(
        &'a self,
        collection: Collection,
        visibility: Visibility,
    ) -> BoxFuture<'a, Result<Vec<Value>>> {
        Box::pin(async move {
            let result = self
                .call(
                    "queryCollection",
                    &[
                        JsValue::from_str(collection.name()),
                        JsValue::from_bool(visibility == Visibility::PublicOnly),
                    ],
                )
                .await?;
            from_js(result)
        })
    }

    fn get_singleton<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Option<Value>>> {
        Box::pin(async move {
            let result = self
                .call("getSingleton", &[JsValue::from_str(name)])
                .await?;
            if result.is_null() || result.is_undefined() {
                return Ok(None);
            }
            from_js(result).map(Some)
        })
    }

    fn upsert_many<'a>(
        &'a self,
        collection: Collection,
        rows: Vec<Value>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.call(
                "upsertMany",
                &[JsValue::from_str(collection.name()), to_js(&rows)?],
            )
            .await?;
            Ok(())
        })
    }

    fn delete_many<'a>(
        &'a self,
        collection: Collection,
        ids: Vec<String>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.call(
                "deleteMany",
                &[JsValue::from_str(collection.name()), to_js(&ids)?],
            )
            .await?;
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
            self.call(
                "updateItem",
                &[
                    JsValue::from_str(collection.name()),
                    JsValue::from_str(id),
                    to_js(&patch)?,
                ],
            )
            .await?;
            Ok(())
        })
    }

    fn update_singleton<'a>(&'a self, name: &'a str, row: Value) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.call("updateSingleton", &[JsValue::from_str(name), to_js(&row)?])
                .await?;
            Ok(())
        })
    }

    fn authenticate<'a>(
        &'a self,
        email: &'a str,
        secret: &'a str,
    ) -> BoxFuture<'a, Result<Session>> {
        Box::pin(async move {
            let result = self
                .call(
                    "authenticate",
                    &[JsValue::from_str(email), JsValue::from_str(secret)],
                )
                .await?;
            from_js(result)
        })
    }

    fn current_session<'a>(&'a self) -> BoxFuture<'a, Result<Option<Session>>> {
        Box::pin(async move {
            let result = self.call("currentSession", &[]).await?;
            if result.is_null() || result.is_undefined() {
                return Ok(None);
            }
            from_js(result).map(Some)
        })
    }

    fn sign_out<'a>(&'a self) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.call("signOut", &[]).await?;
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
        content_type: &'a str,
        bytes: Vec<u8>,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let buffer = Uint8Array::from(bytes.as_slice());
            let result = self
                .call(
                    "uploadObject",
                    &[
                        JsValue::from_str(bucket),
                        JsValue::from_str(path),
                        JsValue::from_str(content_type),
                        buffer.into(),
                    ],
                )
                .await?;
            result
                .as_string()
                .ok_or_else(|| FbaError::Remote("uploadObject returned no URL".to_string()))
        })
    }
}
