//! REST client for the hosted backend.
//!
//! Implements [`ContentGateway`] against the backend's data API (PostgREST
//! query encoding), password-grant auth endpoint, and object storage
//! endpoint. Timeouts and retries are whatever the HTTP client does by
//! default; nothing extra is layered on top.

use std::sync::{Arc, RwLock};

use serde_json::Value;

use fba_core::config::GatewayConfig;
use fba_core::error::Result as CoreResult;
use fba_core::gateway::{
    BoxFuture, ChangeCallback, ChangeEvent, Collection, ContentGateway, Session, Visibility,
};
use fba_core::notify::{CallbackRegistry, SubscriptionId};

use crate::error::{GatewayError, Result};

/// Native `ContentGateway` over the hosted backend's REST surface.
pub struct RestGateway {
    http: reqwest::Client,
    config: GatewayConfig,
    session: RwLock<Option<Session>>,
    pub(crate) changes: Arc<CallbackRegistry<ChangeEvent>>,
}

impl RestGateway {
    /// Create a client for the configured backend.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        // Validate the endpoint eagerly so misconfiguration surfaces at
        // connect time, not on the first query.
        url::Url::parse(&config.endpoint_url)?;
        Ok(Self {
            http: reqwest::Client::new(),
            config,
            session: RwLock::new(None),
            changes: Arc::new(CallbackRegistry::new()),
        })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn endpoint(&self) -> &str {
        self.config.endpoint_url.trim_end_matches('/')
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.endpoint(), table)
    }

    /// Bearer token for data calls: the session token when logged in, the
    /// publishable key otherwise.
    fn bearer_token(&self) -> String {
        self.session
            .read()
            .unwrap()
            .as_ref()
            .map(|session| session.access_token.clone())
            .unwrap_or_else(|| self.config.publishable_key.clone())
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.config.publishable_key)
            .header("Authorization", format!("Bearer {}", self.bearer_token()))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// Encode a PostgREST `in` filter for a set of identifiers.
pub(crate) fn in_filter(ids: &[String]) -> String {
    format!("in.({})", ids.join(","))
}

/// Public URL for a stored object.
pub(crate) fn public_object_url(endpoint: &str, bucket: &str, path: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{bucket}/{path}",
        endpoint.trim_end_matches('/')
    )
}

/// Decode the auth endpoint's token response into a session.
pub(crate) fn parse_session_response(body: &Value) -> Result<Session> {
    let access_token = body
        .get("access_token")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::Response("token response without access_token".to_string()))?;

    let user = body.get("user");
    let user_id = user
        .and_then(|u| u.get("id"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    Ok(Session {
        access_token: access_token.to_string(),
        user_id: user_id.to_string(),
        email: user
            .and_then(|u| u.get("email"))
            .and_then(Value::as_str)
            .map(String::from),
        expires_at: body.get("expires_at").and_then(Value::as_i64),
    })
}

impl ContentGateway for RestGateway {
    fn query_collection<'a>(
        &'a self,
        collection: Collection,
        visibility: Visibility,
    ) -> BoxFuture<'a, CoreResult<Vec<Value>>> {
        Box::pin(async move {
            let mut request = self
                .request(reqwest::Method::GET, &self.rest_url(collection.name()))
                .query(&[("select", "*"), ("order", "order_index.asc")]);
            if visibility == Visibility::PublicOnly {
                request = request.query(&[("hidden", "eq.false")]);
            }

            let response = Self::check(request.send().await.map_err(GatewayError::from)?).await?;
            let rows: Vec<Value> = response.json().await.map_err(GatewayError::from)?;
            log::debug!("fetched {} rows from {collection}", rows.len());
            Ok(rows)
        })
    }

    fn get_singleton<'a>(&'a self, name: &'a str) -> BoxFuture<'a, CoreResult<Option<Value>>> {
        Box::pin(async move {
            let request = self
                .request(reqwest::Method::GET, &self.rest_url(name))
                .query(&[("select", "*"), ("id", "eq.true")]);

            let response = Self::check(request.send().await.map_err(GatewayError::from)?).await?;
            let mut rows: Vec<Value> = response.json().await.map_err(GatewayError::from)?;
            Ok(if rows.is_empty() {
                None
            } else {
                Some(rows.swap_remove(0))
            })
        })
    }

    fn upsert_many<'a>(
        &'a self,
        collection: Collection,
        rows: Vec<Value>,
    ) -> BoxFuture<'a, CoreResult<()>> {
        Box::pin(async move {
            let request = self
                .request(reqwest::Method::POST, &self.rest_url(collection.name()))
                .header("Prefer", "resolution=merge-duplicates,return=minimal")
                .json(&rows);

            Self::check(request.send().await.map_err(GatewayError::from)?).await?;
            Ok(())
        })
    }

    fn delete_many<'a>(
        &'a self,
        collection: Collection,
        ids: Vec<String>,
    ) -> BoxFuture<'a, CoreResult<()>> {
        Box::pin(async move {
            let request = self
                .request(reqwest::Method::DELETE, &self.rest_url(collection.name()))
                .query(&[("id", in_filter(&ids).as_str())]);

            Self::check(request.send().await.map_err(GatewayError::from)?).await?;
            Ok(())
        })
    }

    fn update_item<'a>(
        &'a self,
        collection: Collection,
        id: &'a str,
        patch: Value,
    ) -> BoxFuture<'a, CoreResult<()>> {
        Box::pin(async move {
            let request = self
                .request(reqwest::Method::PATCH, &self.rest_url(collection.name()))
                .query(&[("id", format!("eq.{id}").as_str())])
                .header("Prefer", "return=minimal")
                .json(&patch);

            Self::check(request.send().await.map_err(GatewayError::from)?).await?;
            Ok(())
        })
    }

    fn update_singleton<'a>(&'a self, name: &'a str, row: Value) -> BoxFuture<'a, CoreResult<()>> {
        Box::pin(async move {
            let request = self
                .request(reqwest::Method::PATCH, &self.rest_url(name))
                .query(&[("id", "eq.true")])
                .header("Prefer", "return=minimal")
                .json(&row);

            Self::check(request.send().await.map_err(GatewayError::from)?).await?;
            Ok(())
        })
    }

    fn authenticate<'a>(
        &'a self,
        email: &'a str,
        secret: &'a str,
    ) -> BoxFuture<'a, CoreResult<Session>> {
        Box::pin(async move {
            let url = format!("{}/auth/v1/token?grant_type=password", self.endpoint());
            let response = self
                .http
                .post(&url)
                .header("apikey", &self.config.publishable_key)
                .json(&serde_json::json!({ "email": email, "password": secret }))
                .send()
                .await
                .map_err(GatewayError::from)?;

            if response.status().as_u16() == 400 || response.status().as_u16() == 401 {
                let body = response.text().await.unwrap_or_default();
                return Err(GatewayError::Auth(body).into());
            }
            let response = Self::check(response).await?;
            let body: Value = response.json().await.map_err(GatewayError::from)?;
            let session = parse_session_response(&body)?;

            *self.session.write().unwrap() = Some(session.clone());
            Ok(session)
        })
    }

    fn current_session<'a>(&'a self) -> BoxFuture<'a, CoreResult<Option<Session>>> {
        Box::pin(async move { Ok(self.session.read().unwrap().clone()) })
    }

    fn sign_out<'a>(&'a self) -> BoxFuture<'a, CoreResult<()>> {
        Box::pin(async move {
            let token = self.session.write().unwrap().take();
            if let Some(session) = token {
                // Best-effort revocation; local state is already cleared.
                let url = format!("{}/auth/v1/logout", self.endpoint());
                let _ = self
                    .http
                    .post(&url)
                    .header("apikey", &self.config.publishable_key)
                    .header(
                        "Authorization",
                        format!("Bearer {}", session.access_token),
                    )
                    .send()
                    .await;
            }
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
    ) -> BoxFuture<'a, CoreResult<String>> {
        Box::pin(async move {
            let url = format!("{}/storage/v1/object/{bucket}/{path}", self.endpoint());
            let request = self
                .request(reqwest::Method::POST, &url)
                .header("Content-Type", content_type)
                .header("Cache-Control", "max-age=3600")
                .body(bytes);

            Self::check(request.send().await.map_err(GatewayError::from)?).await?;
            Ok(public_object_url(self.endpoint(), bucket, path))
        })
    }
}
