//! Speculative (optimistic) single-item mutations.
//!
//! The pattern is always the same: snapshot the previous value, apply the
//! new value locally, attempt the remote effect, and restore the snapshot if
//! the remote effect fails. [`speculative_apply`] is that pattern once;
//! visibility toggles and settings updates build on it instead of each
//! reimplementing the rollback.

use std::future::Future;

use serde_json::json;

use crate::content::{ContentRecord, SiteSettings};
use crate::draft::DraftList;
use crate::error::{FbaError, Result};
use crate::gateway::{ContentGateway, SITE_SETTINGS};

/// Apply `next` to `slot`, restoring the previous value if `effect` fails.
///
/// The effect future is constructed by the caller and only polled after the
/// local apply, so the slot already holds the new value while the remote
/// call is in flight.
pub async fn speculative_apply<T, Fut>(slot: &mut T, next: T, effect: Fut) -> Result<()>
where
    T: Clone,
    Fut: Future<Output = Result<()>>,
{
    let previous = std::mem::replace(slot, next);
    let outcome = effect.await;
    if let Err(err) = outcome {
        *slot = previous;
        return Err(err);
    }
    Ok(())
}

/// Flip an item's hidden flag with low latency.
///
/// The flip lands in the draft store immediately. With a gateway connected,
/// a single-field remote update follows; a remote failure rolls the local
/// flip back and surfaces the error. Without a gateway the flip stays
/// local-only, to be persisted by the next full save.
///
/// Returns the item's new hidden value on success.
pub async fn toggle_hidden<T: ContentRecord>(
    gateway: Option<&dyn ContentGateway>,
    list: &mut DraftList<T>,
    id: &str,
) -> Result<bool> {
    let item = list.get_mut(id).ok_or_else(|| FbaError::UnknownItem {
        collection: T::COLLECTION.name(),
        id: id.to_string(),
    })?;

    let next_hidden = !item.hidden();
    let mut next = item.clone();
    next.set_hidden(next_hidden);

    match gateway {
        None => {
            *item = next;
            Ok(next_hidden)
        }
        Some(gateway) => {
            let patch = json!({ "hidden": next_hidden });
            let effect = gateway.update_item(T::COLLECTION, id, patch);
            speculative_apply(item, next, effect).await?;
            Ok(next_hidden)
        }
    }
}

/// Replace the site settings, rolling back the local copy on remote failure.
pub async fn update_settings(
    gateway: Option<&dyn ContentGateway>,
    settings: &mut SiteSettings,
    next: SiteSettings,
) -> Result<()> {
    let gateway = gateway.ok_or(FbaError::GatewayUnavailable)?;
    let row = next.to_row()?;
    let effect = gateway.update_singleton(SITE_SETTINGS, row);
    speculative_apply(settings, next, effect).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Post;
    use crate::gateway::Collection;
    use crate::test_support::MemoryGateway;
    use futures_lite::future::block_on;
    use serde_json::{Value, json};

    fn gateway_with_post(hidden: bool) -> MemoryGateway {
        let gateway = MemoryGateway::new();
        gateway.seed(
            Collection::Posts,
            vec![json!({ "id": "p1", "title": "A", "hidden": hidden, "order_index": 0 })],
        );
        gateway
    }

    fn loaded_list(gateway: &MemoryGateway) -> DraftList<Post> {
        let rows = block_on(gateway.query_collection(
            Collection::Posts,
            crate::gateway::Visibility::All,
        ))
        .unwrap();
        let mut list = DraftList::new();
        list.load(rows.iter().map(Post::from_row).collect());
        list
    }

    #[test]
    fn test_toggle_applies_locally_and_remotely() {
        block_on(async {
            let gateway = gateway_with_post(false);
            let mut list = loaded_list(&gateway);

            let now_hidden = toggle_hidden(Some(&gateway), &mut list, "p1").await.unwrap();
            assert!(now_hidden);
            assert!(list.get("p1").unwrap().hidden);

            let stored = &gateway.rows(Collection::Posts)[0];
            assert_eq!(stored["hidden"], Value::Bool(true));
        });
    }

    // Forced remote failure leaves the draft store showing the original
    // value again once the failure resolves.
    #[test]
    fn test_toggle_rolls_back_on_remote_failure() {
        block_on(async {
            let gateway = gateway_with_post(false);
            let mut list = loaded_list(&gateway);
            gateway.fail_op("update_item");

            let err = toggle_hidden(Some(&gateway), &mut list, "p1").await.unwrap_err();
            assert!(matches!(err, FbaError::Remote(_)));

            assert!(!list.get("p1").unwrap().hidden);
            let stored = &gateway.rows(Collection::Posts)[0];
            assert_eq!(stored["hidden"], Value::Bool(false));
        });
    }

    #[test]
    fn test_toggle_without_gateway_stays_local() {
        block_on(async {
            let gateway = gateway_with_post(false);
            let mut list = loaded_list(&gateway);

            let now_hidden = toggle_hidden(None, &mut list, "p1").await.unwrap();
            assert!(now_hidden);
            assert!(list.get("p1").unwrap().hidden);
        });
    }

    #[test]
    fn test_toggle_unknown_item() {
        block_on(async {
            let gateway = gateway_with_post(false);
            let mut list = loaded_list(&gateway);

            let err = toggle_hidden(Some(&gateway), &mut list, "nope").await.unwrap_err();
            assert!(matches!(err, FbaError::UnknownItem { .. }));
        });
    }

    #[test]
    fn test_settings_update_rolls_back_on_failure() {
        block_on(async {
            let gateway = MemoryGateway::new();
            let mut settings = SiteSettings::default();
            let mut next = settings.clone();
            next.colors.accent = "#00FF00".to_string();

            gateway.fail_op("update_singleton:site_settings");
            let err = update_settings(Some(&gateway), &mut settings, next.clone())
                .await
                .unwrap_err();
            assert!(matches!(err, FbaError::Remote(_)));
            assert_eq!(settings.colors.accent, "#E10600");

            gateway.clear_failure("update_singleton:site_settings");
            update_settings(Some(&gateway), &mut settings, next).await.unwrap();
            assert_eq!(settings.colors.accent, "#00FF00");
        });
    }

    #[test]
    fn test_settings_update_refused_without_gateway() {
        block_on(async {
            let mut settings = SiteSettings::default();
            let next = settings.clone();
            let err = update_settings(None, &mut settings, next).await.unwrap_err();
            assert!(matches!(err, FbaError::GatewayUnavailable));
        });
    }
}
