//! Integration tests for the full edit cycle: login, edit-mode load, draft
//! mutations, reorder, save, optimistic toggles, and session loss.

mod edit_cycle_tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use futures_lite::future::block_on;
    use serde_json::{Value, json};

    use fba_core::admin::Admin;
    use fba_core::content::{MerchItem, Post};
    use fba_core::error::FbaError;
    use fba_core::gateway::{
        BoxFuture, ChangeCallback, ChangeEvent, Collection, ContentGateway, SITE_INFO, Session,
        Visibility,
    };
    use fba_core::notify::{CallbackRegistry, SubscriptionId};

    /// Mock gateway for testing (simulates the hosted backend).
    #[derive(Default)]
    struct MockGateway {
        collections: Mutex<HashMap<&'static str, Vec<Value>>>,
        singletons: Mutex<HashMap<String, Value>>,
        failing: Mutex<Option<String>>,
        changes: CallbackRegistry<ChangeEvent>,
    }

    impl MockGateway {
        fn new() -> Arc<Self> {
            let gateway = Self::default();
            gateway.singletons.lock().unwrap().insert(
                SITE_INFO.to_string(),
                json!({ "id": true, "body_richtext": [] }),
            );
            Arc::new(gateway)
        }

        fn seed_posts(&self, rows: Vec<Value>) {
            self.collections.lock().unwrap().insert("posts", rows);
        }

        fn rows(&self, collection: Collection) -> Vec<Value> {
            self.collections
                .lock()
                .unwrap()
                .get(collection.name())
                .cloned()
                .unwrap_or_default()
        }

        fn fail_next(&self, label: &str) {
            *self.failing.lock().unwrap() = Some(label.to_string());
        }

        fn check(&self, label: &str) -> Result<(), FbaError> {
            let failing = self.failing.lock().unwrap();
            if failing.as_deref() == Some(label) {
                return Err(FbaError::Remote(format!("forced failure: {label}")));
            }
            Ok(())
        }

        fn notify_change(&self, collection: &str) {
            self.changes.emit(&ChangeEvent {
                collection: Some(collection.to_string()),
            });
        }
    }

    fn row_id(row: &Value) -> String {
        row["id"].as_str().unwrap_or_default().to_string()
    }

    impl ContentGateway for MockGateway {
        fn query_collection<'a>(
            &'a self,
            collection: Collection,
            visibility: Visibility,
        ) -> BoxFuture<'a, Result<Vec<Value>, FbaError>> {
            Box::pin(async move {
                let mut rows = self.rows(collection);
                if visibility == Visibility::PublicOnly {
                    rows.retain(|row| !row["hidden"].as_bool().unwrap_or(false));
                }
                rows.sort_by_key(|row| row["order_index"].as_i64().unwrap_or(0));
                Ok(rows)
            })
        }

        fn get_singleton<'a>(
            &'a self,
            name: &'a str,
        ) -> BoxFuture<'a, Result<Option<Value>, FbaError>> {
            Box::pin(async move { Ok(self.singletons.lock().unwrap().get(name).cloned()) })
        }

        fn upsert_many<'a>(
            &'a self,
            collection: Collection,
            rows: Vec<Value>,
        ) -> BoxFuture<'a, Result<(), FbaError>> {
            Box::pin(async move {
                self.check(&format!("upsert:{collection}"))?;
                let mut collections = self.collections.lock().unwrap();
                let stored = collections.entry(collection.name()).or_default();
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
        ) -> BoxFuture<'a, Result<(), FbaError>> {
            Box::pin(async move {
                self.check(&format!("delete:{collection}"))?;
                let mut collections = self.collections.lock().unwrap();
                if let Some(stored) = collections.get_mut(collection.name()) {
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
        ) -> BoxFuture<'a, Result<(), FbaError>> {
            Box::pin(async move {
                self.check("update_item")?;
                let mut collections = self.collections.lock().unwrap();
                let stored = collections.entry(collection.name()).or_default();
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

        fn update_singleton<'a>(
            &'a self,
            name: &'a str,
            row: Value,
        ) -> BoxFuture<'a, Result<(), FbaError>> {
            Box::pin(async move {
                self.check(&format!("update_singleton:{name}"))?;
                self.singletons
                    .lock()
                    .unwrap()
                    .insert(name.to_string(), row);
                Ok(())
            })
        }

        fn authenticate<'a>(
            &'a self,
            email: &'a str,
            secret: &'a str,
        ) -> BoxFuture<'a, Result<Session, FbaError>> {
            Box::pin(async move {
                if email == "op@example.com" && secret == "secret" {
                    Ok(Session {
                        access_token: "test-token".to_string(),
                        user_id: "user-1".to_string(),
                        email: Some(email.to_string()),
                        expires_at: None,
                    })
                } else {
                    Err(FbaError::Remote("invalid credentials".to_string()))
                }
            })
        }

        fn current_session<'a>(&'a self) -> BoxFuture<'a, Result<Option<Session>, FbaError>> {
            Box::pin(async move { Ok(None) })
        }

        fn sign_out<'a>(&'a self) -> BoxFuture<'a, Result<(), FbaError>> {
            Box::pin(async move { Ok(()) })
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
        ) -> BoxFuture<'a, Result<String, FbaError>> {
            Box::pin(async move { Ok(format!("https://cdn.example/{bucket}/{path}")) })
        }
    }

    fn post_row(id: &str, rank: i64, hidden: bool) -> Value {
        json!({
            "id": id,
            "created_at": "2024-01-01T12:00:00Z",
            "title": id.to_uppercase(),
            "header_media_url": "",
            "header_media_type": "image",
            "body_richtext": [],
            "external_links": [],
            "hidden": hidden,
            "order_index": rank
        })
    }

    fn logged_in_admin() -> (Admin, Arc<MockGateway>) {
        let gateway = MockGateway::new();
        gateway.seed_posts(vec![
            post_row("a", 0, false),
            post_row("b", 1, false),
            post_row("c", 2, true),
        ]);

        let mut admin = Admin::new();
        admin.connect(gateway.clone());
        block_on(admin.login("op@example.com", "secret")).unwrap();
        (admin, gateway)
    }

    #[test]
    fn test_full_edit_cycle() {
        block_on(async {
            let (mut admin, gateway) = logged_in_admin();

            // Edit mode loads everything, hidden rows included.
            admin.enter_edit_mode().await.unwrap();
            assert_eq!(admin.drafts.posts.len(), 3);

            // Edit one post, add a new one, remove another, reorder.
            let mut edited = admin.drafts.posts.get("b").unwrap().clone();
            edited.title = "EDITED".to_string();
            admin.upsert_post(edited);

            let new_post = Post::new_draft();
            let new_id = new_post.id.clone();
            admin.upsert_post(new_post);

            admin.remove_item(Collection::Posts, "a");
            assert!(admin.move_item(Collection::Posts, 0, 2));

            let report = admin.save().await.unwrap();
            assert_eq!(report.upserted, 3);
            assert_eq!(report.deleted, 1);

            // Remote state converged: a gone, ranks dense in list order.
            let rows = gateway.rows(Collection::Posts);
            assert_eq!(rows.len(), 3);
            assert!(rows.iter().all(|row| row_id(row) != "a"));

            let mut ranked: Vec<(String, i64)> = rows
                .iter()
                .map(|row| (row_id(row), row["order_index"].as_i64().unwrap()))
                .collect();
            ranked.sort_by_key(|(_, rank)| *rank);
            let ranks: Vec<i64> = ranked.iter().map(|(_, rank)| *rank).collect();
            assert_eq!(ranks, vec![0, 1, 2]);
            assert!(ranked.iter().any(|(id, _)| id == &new_id));

            // Second save with no mutations: idempotent, empty delete set.
            let report = admin.save().await.unwrap();
            assert_eq!(report.deleted, 0);
            assert_eq!(gateway.rows(Collection::Posts).len(), 3);
        });
    }

    #[test]
    fn test_public_cache_never_contains_hidden_items() {
        block_on(async {
            let (mut admin, _gateway) = logged_in_admin();

            admin.refresh_cache().await;
            let ids: Vec<&str> = admin.cache.posts.iter().map(|p| p.id.as_str()).collect();
            assert_eq!(ids, vec!["a", "b"]);

            // The draft store holds the hidden row; the cache still does not.
            admin.enter_edit_mode().await.unwrap();
            assert!(admin.drafts.posts.get("c").is_some());
            admin.refresh_cache().await;
            assert!(admin.cache.posts.iter().all(|p| p.id != "c"));
        });
    }

    #[test]
    fn test_optimistic_toggle_rollback_end_to_end() {
        block_on(async {
            let (mut admin, gateway) = logged_in_admin();
            admin.enter_edit_mode().await.unwrap();

            gateway.fail_next("update_item");
            let err = admin.toggle_hidden(Collection::Posts, "a").await.unwrap_err();
            assert!(matches!(err, FbaError::Remote(_)));

            // No permanent divergence: draft and remote both still visible.
            assert!(!admin.drafts.posts.get("a").unwrap().hidden);
            let row = gateway
                .rows(Collection::Posts)
                .into_iter()
                .find(|row| row_id(row) == "a")
                .unwrap();
            assert_eq!(row["hidden"], Value::Bool(false));
        });
    }

    #[test]
    fn test_partial_save_failure_keeps_deletion_pending() {
        block_on(async {
            let (mut admin, gateway) = logged_in_admin();
            admin.enter_edit_mode().await.unwrap();

            admin.remove_item(Collection::Posts, "b");
            gateway.fail_next("delete:posts");

            let err = admin.save().await.unwrap_err();
            assert!(matches!(err, FbaError::SaveFailed(_)));

            // Retrying the whole save converges.
            gateway.fail_next("nothing");
            admin.save().await.unwrap();
            assert!(gateway.rows(Collection::Posts).iter().all(|row| row_id(row) != "b"));
        });
    }

    #[test]
    fn test_change_notification_triggers_full_refetch() {
        block_on(async {
            let (mut admin, gateway) = logged_in_admin();
            admin.refresh_cache().await;
            assert_eq!(admin.cache.posts.len(), 2);

            // A subscriber exists and change events reach it; the host then
            // drives the re-fetch.
            let seen = Arc::new(Mutex::new(0usize));
            let seen_clone = Arc::clone(&seen);
            let subscription = gateway.subscribe_changes(Arc::new(move |_event| {
                *seen_clone.lock().unwrap() += 1;
            }));

            gateway.seed_posts(vec![post_row("fresh", 0, false)]);
            gateway.notify_change("posts");
            assert_eq!(*seen.lock().unwrap(), 1);

            admin.handle_remote_change().await;
            let ids: Vec<&str> = admin.cache.posts.iter().map(|p| p.id.as_str()).collect();
            assert_eq!(ids, vec!["fresh"]);

            gateway.unsubscribe_changes(subscription);
        });
    }

    #[test]
    fn test_session_expiry_mid_edit() {
        block_on(async {
            let (mut admin, _gateway) = logged_in_admin();
            admin.enter_edit_mode().await.unwrap();

            // Passive expiry observed asynchronously.
            admin.observe_session(None);
            assert!(!admin.gate().is_edit_mode());

            // Editing again requires a fresh login.
            let err = admin.enter_edit_mode().await.unwrap_err();
            assert!(matches!(err, FbaError::NotAuthenticated));
        });
    }

    #[test]
    fn test_merch_image_invariant_survives_save() {
        block_on(async {
            let (mut admin, gateway) = logged_in_admin();
            admin.enter_edit_mode().await.unwrap();

            let mut item = MerchItem::new_draft();
            item.push_image("https://cdn.example/front.png");
            item.push_image("https://cdn.example/back.png");
            admin.upsert_merch(item).unwrap();

            admin.save().await.unwrap();

            let rows = gateway.rows(Collection::Merch);
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0]["image_url"], rows[0]["image_urls"][0]);
        });
    }
}
