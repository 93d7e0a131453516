//! The reconciler: one coordinated save from the draft store to the gateway.
//!
//! Saving stamps every item's order rank from its list position, diffs the
//! initial snapshots for deletions, and issues the whole batch - bulk
//! upserts, the info singleton update, bulk deletes - as concurrent
//! in-flight requests joined at the end. Failures aggregate into a single
//! report; partial successes are not rolled back (the save is retried
//! wholesale, and upsert-by-id makes the retry idempotent per item).

use futures_util::future::join_all;
use serde::Serialize;
use serde_json::Value;
use ts_rs::TS;

use crate::content::{AppItem, ContentRecord, MerchItem, Post, SiteInfo};
use crate::draft::{DraftList, DraftStore};
use crate::error::{FbaError, Result};
use crate::gateway::{BoxFuture, Collection, ContentGateway, SITE_INFO, Visibility};

/// What a successful save did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SaveReport {
    /// Items written across the three collections.
    pub upserted: usize,
    /// Items deleted across the three collections.
    pub deleted: usize,
    /// Whether the info singleton was written.
    pub info_updated: bool,
}

/// Load the full collections - hidden included - into the draft store,
/// capturing the initial snapshots used for deletion diffing.
pub async fn load_drafts(gateway: &dyn ContentGateway, drafts: &mut DraftStore) -> Result<()> {
    let (posts, merch, apps, info) = futures_util::join!(
        gateway.query_collection(Collection::Posts, Visibility::All),
        gateway.query_collection(Collection::Merch, Visibility::All),
        gateway.query_collection(Collection::Apps, Visibility::All),
        gateway.get_singleton(SITE_INFO),
    );

    drafts.posts.load(decode_rows::<Post>(posts?));
    drafts.merch.load(decode_rows::<MerchItem>(merch?));
    drafts.apps.load(decode_rows::<AppItem>(apps?));
    drafts.info = info?.map(|row| SiteInfo::from_row(&row));
    drafts.mark_loaded();
    Ok(())
}

/// Converge remote state to the draft store's working copies.
///
/// On full success the initial snapshots are resynchronized to the working
/// copies, so the next save diffs against the just-saved state. On any
/// failure the snapshots are left untouched and a single aggregated
/// [`FbaError::SaveFailed`] is returned.
pub async fn save_drafts(
    gateway: &dyn ContentGateway,
    drafts: &mut DraftStore,
) -> Result<SaveReport> {
    // List position implies rank; make it explicit before encoding rows.
    drafts.posts.stamp_ranks();
    drafts.merch.stamp_ranks();
    drafts.apps.stamp_ranks();
    for item in drafts.merch.items_mut() {
        item.sync_legacy_image();
    }

    let post_rows = encode_rows(&drafts.posts)?;
    let merch_rows = encode_rows(&drafts.merch)?;
    let app_rows = encode_rows(&drafts.apps)?;

    let posts_to_delete = drafts.posts.pending_deletions();
    let merch_to_delete = drafts.merch.pending_deletions();
    let apps_to_delete = drafts.apps.pending_deletions();

    let report = SaveReport {
        upserted: post_rows.len() + merch_rows.len() + app_rows.len(),
        deleted: posts_to_delete.len() + merch_to_delete.len() + apps_to_delete.len(),
        info_updated: drafts.info.is_some(),
    };

    let mut labels: Vec<String> = Vec::new();
    let mut ops: Vec<BoxFuture<'_, Result<()>>> = Vec::new();

    labels.push("posts".to_string());
    ops.push(gateway.upsert_many(Collection::Posts, post_rows));
    labels.push("merch".to_string());
    ops.push(gateway.upsert_many(Collection::Merch, merch_rows));
    labels.push("apps".to_string());
    ops.push(gateway.upsert_many(Collection::Apps, app_rows));

    if let Some(info) = &drafts.info {
        labels.push("site info".to_string());
        ops.push(gateway.update_singleton(SITE_INFO, info.to_row()?));
    }
    if !posts_to_delete.is_empty() {
        labels.push("posts deletions".to_string());
        ops.push(gateway.delete_many(Collection::Posts, posts_to_delete));
    }
    if !merch_to_delete.is_empty() {
        labels.push("merch deletions".to_string());
        ops.push(gateway.delete_many(Collection::Merch, merch_to_delete));
    }
    if !apps_to_delete.is_empty() {
        labels.push("apps deletions".to_string());
        ops.push(gateway.delete_many(Collection::Apps, apps_to_delete));
    }

    // No ordering is guaranteed between the in-flight requests; the single-
    // operator assumption means they never target overlapping identifiers.
    let results = join_all(ops).await;

    let failures: Vec<String> = labels
        .iter()
        .zip(&results)
        .filter_map(|(label, result)| {
            result
                .as_ref()
                .err()
                .map(|err| format!("{label}: {err}"))
        })
        .collect();

    if !failures.is_empty() {
        log::warn!("save failed ({} of {} operations)", failures.len(), results.len());
        return Err(FbaError::SaveFailed(failures.join("; ")));
    }

    drafts.posts.commit();
    drafts.merch.commit();
    drafts.apps.commit();
    log::debug!(
        "saved {} items, deleted {}, info updated: {}",
        report.upserted,
        report.deleted,
        report.info_updated
    );
    Ok(report)
}

fn decode_rows<T: ContentRecord>(rows: Vec<Value>) -> Vec<T> {
    rows.iter().map(T::from_row).collect()
}

fn encode_rows<T: ContentRecord>(list: &DraftList<T>) -> Result<Vec<Value>> {
    list.items().iter().map(ContentRecord::to_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Post;
    use crate::test_support::MemoryGateway;
    use futures_lite::future::block_on;
    use serde_json::json;

    fn post_row(id: &str, rank: i64) -> Value {
        json!({
            "id": id,
            "created_at": "2024-01-01T12:00:00Z",
            "title": id.to_uppercase(),
            "header_media_url": "",
            "header_media_type": "image",
            "body_richtext": [],
            "external_links": [],
            "hidden": false,
            "order_index": rank
        })
    }

    fn seeded_gateway() -> MemoryGateway {
        let gateway = MemoryGateway::new();
        gateway.seed(
            Collection::Posts,
            vec![post_row("a", 0), post_row("b", 1), post_row("c", 2)],
        );
        gateway.seed_singleton(
            SITE_INFO,
            json!({ "id": true, "body_richtext": [] }),
        );
        gateway
    }

    #[test]
    fn test_load_captures_full_collections() {
        block_on(async {
            let gateway = seeded_gateway();
            let mut drafts = DraftStore::new();

            load_drafts(&gateway, &mut drafts).await.unwrap();

            assert_eq!(drafts.posts.len(), 3);
            assert!(drafts.info.is_some());
            assert!(drafts.is_loaded());
        });
    }

    #[test]
    fn test_load_includes_hidden_rows() {
        block_on(async {
            let gateway = MemoryGateway::new();
            let mut hidden = post_row("h", 0);
            hidden["hidden"] = json!(true);
            gateway.seed(Collection::Posts, vec![hidden]);

            let mut drafts = DraftStore::new();
            load_drafts(&gateway, &mut drafts).await.unwrap();
            assert_eq!(drafts.posts.len(), 1);
            assert!(drafts.posts.items()[0].hidden);
        });
    }

    // Initial {a, b, c}, working {a, c} => delete [b], upsert [a(0), c(1)].
    #[test]
    fn test_deletion_diffing() {
        block_on(async {
            let gateway = seeded_gateway();
            let mut drafts = DraftStore::new();
            load_drafts(&gateway, &mut drafts).await.unwrap();

            drafts.posts.remove("b");
            let report = save_drafts(&gateway, &mut drafts).await.unwrap();

            assert_eq!(report.deleted, 1);
            let remaining: Vec<String> = gateway
                .rows(Collection::Posts)
                .iter()
                .map(|row| row["id"].as_str().unwrap().to_string())
                .collect();
            assert_eq!(remaining, vec!["a", "c"]);

            let ranks: Vec<i64> = gateway
                .rows(Collection::Posts)
                .iter()
                .map(|row| row["order_index"].as_i64().unwrap())
                .collect();
            assert_eq!(ranks, vec![0, 1]);
        });
    }

    // A second save with no intervening mutation issues no deletes and
    // leaves remote state unchanged.
    #[test]
    fn test_save_idempotence() {
        block_on(async {
            let gateway = seeded_gateway();
            let mut drafts = DraftStore::new();
            load_drafts(&gateway, &mut drafts).await.unwrap();

            drafts.posts.remove("b");
            save_drafts(&gateway, &mut drafts).await.unwrap();
            let rows_after_first = gateway.rows(Collection::Posts);
            let calls_after_first = gateway.calls().len();

            let report = save_drafts(&gateway, &mut drafts).await.unwrap();
            assert_eq!(report.deleted, 0);
            assert_eq!(gateway.rows(Collection::Posts), rows_after_first);

            // No delete call was issued the second time.
            let new_calls = &gateway.calls()[calls_after_first..];
            assert!(new_calls.iter().all(|call| !call.starts_with("delete:")));
        });
    }

    #[test]
    fn test_failure_aggregates_and_keeps_snapshot() {
        block_on(async {
            let gateway = seeded_gateway();
            let mut drafts = DraftStore::new();
            load_drafts(&gateway, &mut drafts).await.unwrap();

            drafts.posts.remove("b");
            gateway.fail_op("delete:posts");

            let err = save_drafts(&gateway, &mut drafts).await.unwrap_err();
            assert!(matches!(err, FbaError::SaveFailed(_)));
            assert!(err.to_string().contains("posts deletions"));

            // Snapshot untouched: the retry re-issues the same delete.
            assert_eq!(drafts.posts.pending_deletions(), vec!["b".to_string()]);

            gateway.clear_failure("delete:posts");
            save_drafts(&gateway, &mut drafts).await.unwrap();
            assert!(drafts.posts.pending_deletions().is_empty());
            assert_eq!(gateway.rows(Collection::Posts).len(), 2);
        });
    }

    #[test]
    fn test_new_item_upserted_with_stamped_rank() {
        block_on(async {
            let gateway = seeded_gateway();
            let mut drafts = DraftStore::new();
            load_drafts(&gateway, &mut drafts).await.unwrap();

            let mut new_post = Post::new_draft();
            new_post.title = "FRESH".to_string();
            let new_id = new_post.id.clone();
            drafts.posts.upsert(new_post);

            save_drafts(&gateway, &mut drafts).await.unwrap();

            let rows = gateway.rows(Collection::Posts);
            assert_eq!(rows.len(), 4);
            let stored = rows
                .iter()
                .find(|row| row["id"].as_str() == Some(new_id.as_str()))
                .unwrap();
            // Prepended item landed at rank 0, not the placeholder rank.
            assert_eq!(stored["order_index"].as_i64(), Some(0));
        });
    }

    #[test]
    fn test_info_singleton_written_when_present() {
        block_on(async {
            let gateway = seeded_gateway();
            let mut drafts = DraftStore::new();
            load_drafts(&gateway, &mut drafts).await.unwrap();

            let mut info = drafts.info.clone().unwrap();
            info.body_richtext = vec![crate::content::RichTextBlock::paragraph("updated")];
            drafts.info = Some(info);

            let report = save_drafts(&gateway, &mut drafts).await.unwrap();
            assert!(report.info_updated);

            let calls = gateway.calls();
            assert!(calls.iter().any(|c| c == "update_singleton:site_info"));
        });
    }
}
