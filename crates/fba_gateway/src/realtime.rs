//! WebSocket change feed.
//!
//! Joins the backend's realtime channel for the public schema and collapses
//! every row-change frame into one opaque [`ChangeEvent`] for subscribers.
//! There is no reconnect or backoff layered on top: a dropped socket ends
//! the feed and the site degrades to manual refresh.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use fba_core::gateway::ChangeEvent;
use fba_core::notify::CallbackRegistry;

use crate::error::Result;
use crate::rest::RestGateway;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Build the realtime socket URL for a backend endpoint.
pub(crate) fn socket_url(endpoint: &str, publishable_key: &str) -> Result<String> {
    let mut url = url::Url::parse(endpoint)?;
    let scheme = if url.scheme() == "http" { "ws" } else { "wss" };
    // set_scheme's error type is (), so surface it as a parse failure.
    url.set_scheme(scheme)
        .map_err(|_| url::ParseError::EmptyHost)?;
    url.set_path("/realtime/v1/websocket");
    url.set_query(Some(&format!("apikey={publishable_key}&vsn=1.0.0")));
    Ok(url.to_string())
}

/// The channel join frame: every row change in the public schema.
fn join_frame() -> String {
    json!({
        "topic": "realtime:public",
        "event": "phx_join",
        "payload": {
            "config": {
                "postgres_changes": [{ "event": "*", "schema": "public" }]
            }
        },
        "ref": "1"
    })
    .to_string()
}

fn heartbeat_frame() -> String {
    json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": "hb"
    })
    .to_string()
}

/// Classify an inbound frame: row-change frames become change events,
/// protocol frames (join replies, heartbeat acks, presence) are dropped.
pub(crate) fn classify_frame(text: &str) -> Option<ChangeEvent> {
    let frame: Value = serde_json::from_str(text).ok()?;
    let event = frame.get("event").and_then(Value::as_str)?;
    if event != "postgres_changes" {
        return None;
    }
    let collection = frame
        .get("payload")
        .and_then(|payload| payload.get("data"))
        .and_then(|data| data.get("table"))
        .and_then(Value::as_str)
        .map(String::from);
    Some(ChangeEvent { collection })
}

impl RestGateway {
    /// Spawn the change-feed task.
    ///
    /// Runs until the socket closes or errors; subscribers registered via
    /// `subscribe_changes` receive one event per observed row change.
    pub fn spawn_change_feed(&self) -> tokio::task::JoinHandle<()> {
        let endpoint = self.config().endpoint_url.clone();
        let key = self.config().publishable_key.clone();
        let changes = Arc::clone(&self.changes);

        tokio::spawn(async move {
            if let Err(err) = run_change_feed(&endpoint, &key, changes).await {
                log::warn!("change feed ended: {err}");
            }
        })
    }
}

async fn run_change_feed(
    endpoint: &str,
    publishable_key: &str,
    changes: Arc<CallbackRegistry<ChangeEvent>>,
) -> Result<()> {
    let url = socket_url(endpoint, publishable_key)?;
    let (stream, _response) = connect_async(&url)
        .await
        .map_err(|err| crate::error::GatewayError::Response(err.to_string()))?;
    let (mut write, mut read) = stream.split();

    write
        .send(Message::Text(join_frame().into()))
        .await
        .map_err(|err| crate::error::GatewayError::Response(err.to_string()))?;
    log::debug!("change feed joined public schema");

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                if write.send(Message::Text(heartbeat_frame().into())).await.is_err() {
                    break;
                }
            }
            message = read.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(event) = classify_frame(&text) {
                            log::debug!(
                                "remote change observed on {}",
                                event.collection.as_deref().unwrap_or("public schema")
                            );
                            changes.emit(&event);
                        }
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        log::warn!("change feed socket error: {err}");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}
