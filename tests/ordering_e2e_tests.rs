//! End-to-end tests simulating a wholesale client and an administrator
//!
//! These tests drive the complete HTTP surface: draft item operations,
//! submission gating, submitted orders and the admin control routes.

use axum::http::StatusCode;
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use chrono::{Duration, TimeZone};
use ordering::prelude::*;
use serde_json::{Value, json};
use std::sync::Arc;

// =============================================================================
// Fixture
// =============================================================================

struct Storefront {
    server: TestServer,
    catalog: InMemoryCatalog,
    images: InMemoryImageStorage,
    clock: Arc<FixedClock>,
    tenant_id: Uuid,
    client_id: Uuid,
    admin_id: Uuid,
    oil: Uuid,
    flour: Uuid,
}

impl Storefront {
    fn new() -> Self {
        let tenant_id = Uuid::new_v4();
        let catalog = InMemoryCatalog::new();
        let images = InMemoryImageStorage::new();
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
        ));

        let oil = Uuid::new_v4();
        let flour = Uuid::new_v4();
        catalog
            .upsert(
                tenant_id,
                ProductSnapshot {
                    id: oil,
                    name: "Olive oil 5L".to_string(),
                    price: Decimal::new(1000, 2),
                    stock: 10,
                    image_path: Some("catalog/oil.png".to_string()),
                },
            )
            .unwrap();
        catalog
            .upsert(
                tenant_id,
                ProductSnapshot {
                    id: flour,
                    name: "Flour 25kg".to_string(),
                    price: Decimal::new(2250, 2),
                    stock: 3,
                    image_path: None,
                },
            )
            .unwrap();

        let app = ServerBuilder::new()
            .with_catalog(catalog.clone())
            .with_image_storage(images.clone())
            .with_clock(clock.clone())
            .build()
            .expect("Failed to build app");

        Self {
            server: TestServer::new(app).expect("Failed to create test server"),
            catalog,
            images,
            clock,
            tenant_id,
            client_id: Uuid::new_v4(),
            admin_id: Uuid::new_v4(),
            oil,
            flour,
        }
    }

    fn tenant(&self) -> String {
        self.tenant_id.to_string()
    }

    fn client(&self) -> String {
        self.client_id.to_string()
    }

    fn admin(&self) -> String {
        self.admin_id.to_string()
    }

    async fn add_listed(&self, product_id: Uuid, quantity: i64) -> axum_test::TestResponse {
        self.server
            .post("/draft/items")
            .add_header("x-tenant-id", self.tenant())
            .add_header("x-client-id", self.client())
            .json(&json!({"productId": product_id, "quantity": quantity}))
            .await
    }

    async fn add_unlisted(&self, description: &str, quantity: &str, image: bool) -> axum_test::TestResponse {
        let mut form = MultipartForm::new()
            .add_text("description", description.to_string())
            .add_text("quantity", quantity.to_string());
        if image {
            form = form.add_part(
                "image",
                Part::bytes(vec![0x89, 0x50, 0x4e, 0x47])
                    .file_name("sample.png")
                    .mime_type("image/png"),
            );
        }

        self.server
            .post("/draft/items/unlisted")
            .add_header("x-tenant-id", self.tenant())
            .add_header("x-client-id", self.client())
            .multipart(form)
            .await
    }

    async fn draft(&self) -> Value {
        let response = self
            .server
            .get("/draft")
            .add_header("x-tenant-id", self.tenant())
            .add_header("x-client-id", self.client())
            .await;
        response.assert_status_ok();
        response.json()
    }

    async fn submit(&self) -> axum_test::TestResponse {
        self.server
            .post("/draft/submit")
            .add_header("x-tenant-id", self.tenant())
            .add_header("x-client-id", self.client())
            .await
    }

    async fn admin_patch(&self, patch: Value) -> axum_test::TestResponse {
        self.server
            .patch("/admin/order-control")
            .add_header("x-tenant-id", self.tenant())
            .add_header("x-admin-id", self.admin())
            .json(&patch)
            .await
    }
}

fn first_item_id(draft: &Value) -> String {
    draft["draft"]["items"][0]["id"]
        .as_str()
        .expect("item id")
        .to_string()
}

// =============================================================================
// Health and identity
// =============================================================================

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoints() {
        let storefront = Storefront::new();

        for path in ["/health", "/healthz"] {
            let response = storefront.server.get(path).await;
            response.assert_status_ok();
            let body: Value = response.json();
            assert_eq!(body["status"], "ok");
        }
    }
}

mod identity_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let storefront = Storefront::new();

        let response = storefront.server.get("/draft").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["code"], "MISSING_HEADER");
    }

    #[tokio::test]
    async fn test_malformed_client_id_is_rejected() {
        let storefront = Storefront::new();

        let response = storefront
            .server
            .get("/draft")
            .add_header("x-tenant-id", storefront.tenant())
            .add_header("x-client-id", "not-a-uuid")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_client_cannot_use_admin_routes() {
        let storefront = Storefront::new();

        let response = storefront
            .server
            .patch("/admin/order-control")
            .add_header("x-tenant-id", storefront.tenant())
            .add_header("x-client-id", storefront.client())
            .json(&json!({"showSalePrice": false}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_drafts_are_per_client() {
        let storefront = Storefront::new();
        storefront.add_listed(storefront.oil, 1).await.assert_status_ok();

        let response = storefront
            .server
            .get("/draft")
            .add_header("x-tenant-id", storefront.tenant())
            .add_header("x-client-id", Uuid::new_v4().to_string())
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["totalItems"], 0);
    }
}

// =============================================================================
// Draft item operations
// =============================================================================

mod draft_tests {
    use super::*;

    #[tokio::test]
    async fn test_new_client_gets_empty_draft() {
        let storefront = Storefront::new();

        let body = storefront.draft().await;
        assert_eq!(body["draft"]["items"], json!([]));
        assert_eq!(body["draft"]["status"], "DRAFT");
        assert_eq!(body["totalItems"], 0);
    }

    #[tokio::test]
    async fn test_totals_exclude_unpriced_items() {
        let storefront = Storefront::new();

        storefront.add_listed(storefront.oil, 2).await.assert_status_ok();
        let response = storefront.add_unlisted("Custom crate of lemons", "1", false).await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["totalItems"], 3);
        assert_eq!(body["estimatedTotal"], "20.00");
        assert_eq!(body["draft"]["items"][0]["kind"], "listed");
        assert_eq!(body["draft"]["items"][0]["unitPrice"], "10.00");
        assert_eq!(body["draft"]["items"][1]["kind"], "unlisted");
        assert!(body["draft"]["items"][1].get("unitPrice").is_none());
    }

    #[tokio::test]
    async fn test_estimated_total_hidden_without_sale_price() {
        let storefront = Storefront::new();
        storefront
            .admin_patch(json!({"showSalePrice": false}))
            .await
            .assert_status_ok();

        let response = storefront.add_listed(storefront.oil, 2).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["totalItems"], 2);
        assert!(body.get("estimatedTotal").is_none());
    }

    #[tokio::test]
    async fn test_adding_same_product_merges_lines() {
        let storefront = Storefront::new();

        storefront.add_listed(storefront.oil, 2).await.assert_status_ok();
        let response = storefront.add_listed(storefront.oil, 3).await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["draft"]["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["draft"]["items"][0]["quantity"], 5);
    }

    #[tokio::test]
    async fn test_insufficient_stock_flags_restock() {
        let storefront = Storefront::new();

        let response = storefront.add_listed(storefront.flour, 4).await;
        response.assert_status(StatusCode::CONFLICT);

        let body: Value = response.json();
        assert_eq!(body["reason"], "out-of-stock");
        assert_eq!(body["code"], "INSUFFICIENT_STOCK");
        assert_eq!(body["details"]["available"], 3);

        let flags = storefront.catalog.restock_flags().unwrap();
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].product_id, storefront.flour);
        assert_eq!(flags[0].requested, 4);

        assert_eq!(storefront.draft().await["totalItems"], 0);
    }

    #[tokio::test]
    async fn test_unknown_product_is_unavailable() {
        let storefront = Storefront::new();

        let response = storefront.add_listed(Uuid::new_v4(), 1).await;
        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["code"], "PRODUCT_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected() {
        let storefront = Storefront::new();

        let response = storefront.add_listed(storefront.oil, 0).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["reason"], "validation");
    }

    #[tokio::test]
    async fn test_blank_unlisted_description_is_rejected() {
        let storefront = Storefront::new();

        let response = storefront.add_unlisted("   ", "1", false).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(storefront.draft().await["totalItems"], 0);
    }

    #[tokio::test]
    async fn test_non_numeric_unlisted_quantity_is_rejected() {
        let storefront = Storefront::new();

        let response = storefront.add_unlisted("Lemons", "many", false).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_quantity_sets_value() {
        let storefront = Storefront::new();
        let draft: Value = storefront.add_listed(storefront.oil, 2).await.json();
        let item_id = first_item_id(&draft);

        let response = storefront
            .server
            .put(&format!("/draft/items/{}", item_id))
            .add_header("x-tenant-id", storefront.tenant())
            .add_header("x-client-id", storefront.client())
            .json(&json!({"quantity": 7}))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["draft"]["items"][0]["quantity"], 7);
        assert_eq!(body["totalItems"], 7);
    }

    #[tokio::test]
    async fn test_update_beyond_stock_is_rejected() {
        let storefront = Storefront::new();
        let draft: Value = storefront.add_listed(storefront.flour, 1).await.json();
        let item_id = first_item_id(&draft);

        let response = storefront
            .server
            .put(&format!("/draft/items/{}", item_id))
            .add_header("x-tenant-id", storefront.tenant())
            .add_header("x-client-id", storefront.client())
            .json(&json!({"quantity": 5}))
            .await;
        response.assert_status(StatusCode::CONFLICT);

        assert_eq!(storefront.draft().await["draft"]["items"][0]["quantity"], 1);
    }

    #[tokio::test]
    async fn test_update_to_zero_removes_item() {
        let storefront = Storefront::new();
        let draft: Value = storefront.add_listed(storefront.oil, 2).await.json();
        let item_id = first_item_id(&draft);

        let response = storefront
            .server
            .put(&format!("/draft/items/{}", item_id))
            .add_header("x-tenant-id", storefront.tenant())
            .add_header("x-client-id", storefront.client())
            .json(&json!({"quantity": 0}))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["draft"]["items"], json!([]));
    }

    #[tokio::test]
    async fn test_remove_unknown_item_is_not_found() {
        let storefront = Storefront::new();

        let response = storefront
            .server
            .delete(&format!("/draft/items/{}", Uuid::new_v4()))
            .add_header("x-tenant-id", storefront.tenant())
            .add_header("x-client-id", storefront.client())
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["reason"], "not-found");
    }

    #[tokio::test]
    async fn test_removing_unlisted_item_deletes_its_image() {
        let storefront = Storefront::new();
        let draft: Value = storefront.add_unlisted("Hand-painted sign", "1", true).await.json();
        let item_id = first_item_id(&draft);
        let path = draft["draft"]["items"][0]["imagePath"]
            .as_str()
            .expect("image stored")
            .to_string();
        assert!(storefront.images.contains(&path));

        let response = storefront
            .server
            .delete(&format!("/draft/items/{}", item_id))
            .add_header("x-tenant-id", storefront.tenant())
            .add_header("x-client-id", storefront.client())
            .await;
        response.assert_status_ok();

        assert!(!storefront.images.contains(&path));
        assert_eq!(storefront.draft().await["draft"]["items"], json!([]));
    }

    #[tokio::test]
    async fn test_removing_listed_item_keeps_catalog_image() {
        let storefront = Storefront::new();
        let draft: Value = storefront.add_listed(storefront.oil, 1).await.json();
        let item_id = first_item_id(&draft);
        assert_eq!(draft["draft"]["items"][0]["imagePath"], "catalog/oil.png");

        let response = storefront
            .server
            .delete(&format!("/draft/items/{}", item_id))
            .add_header("x-tenant-id", storefront.tenant())
            .add_header("x-client-id", storefront.client())
            .await;
        response.assert_status_ok();
        assert!(storefront.images.is_empty());
    }

    #[tokio::test]
    async fn test_delete_item_image() {
        let storefront = Storefront::new();
        let draft: Value = storefront.add_unlisted("Banner", "2", true).await.json();
        let item_id = first_item_id(&draft);

        let response = storefront
            .server
            .delete(&format!("/draft/items/{}/image", item_id))
            .add_header("x-tenant-id", storefront.tenant())
            .add_header("x-client-id", storefront.client())
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        assert!(storefront.images.is_empty());
        let body = storefront.draft().await;
        assert!(body["draft"]["items"][0].get("imagePath").is_none());
        assert_eq!(body["draft"]["items"][0]["quantity"], 2);
    }
}

// =============================================================================
// Submission
// =============================================================================

mod submission_tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_empty_draft_fails() {
        let storefront = Storefront::new();

        let response = storefront.submit().await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["reason"], "empty-order");

        let draft = storefront.draft().await;
        assert_eq!(draft["draft"]["items"], json!([]));
    }

    #[tokio::test]
    async fn test_submit_creates_order_and_clears_draft() {
        let storefront = Storefront::new();
        storefront.add_listed(storefront.oil, 2).await.assert_status_ok();
        storefront.add_unlisted("Lemons", "1", false).await.assert_status_ok();

        let response = storefront.submit().await;
        response.assert_status(StatusCode::CREATED);
        let order: Value = response.json();
        assert_eq!(order["orderNumber"], "WO-000001");
        assert_eq!(order["status"], "SUBMITTED");
        assert_eq!(order["items"].as_array().unwrap().len(), 2);

        let draft = storefront.draft().await;
        assert_eq!(draft["draft"]["items"], json!([]));
        assert_eq!(draft["totalItems"], 0);

        let orders: Value = storefront
            .server
            .get("/orders")
            .add_header("x-tenant-id", storefront.tenant())
            .add_header("x-client-id", storefront.client())
            .await
            .json();
        assert_eq!(orders.as_array().unwrap().len(), 1);
        assert_eq!(orders[0]["id"], order["id"]);
    }

    #[tokio::test]
    async fn test_order_numbers_are_sequential() {
        let storefront = Storefront::new();

        storefront.add_listed(storefront.oil, 1).await.assert_status_ok();
        let first: Value = storefront.submit().await.json();
        storefront.add_listed(storefront.oil, 1).await.assert_status_ok();
        let second: Value = storefront.submit().await.json();

        assert_eq!(first["orderNumber"], "WO-000001");
        assert_eq!(second["orderNumber"], "WO-000002");
    }

    #[tokio::test]
    async fn test_other_clients_order_is_not_found() {
        let storefront = Storefront::new();
        storefront.add_listed(storefront.oil, 1).await.assert_status_ok();
        let order: Value = storefront.submit().await.json();
        let order_id = order["id"].as_str().unwrap().to_string();

        let own = storefront
            .server
            .get(&format!("/orders/{}", order_id))
            .add_header("x-tenant-id", storefront.tenant())
            .add_header("x-client-id", storefront.client())
            .await;
        own.assert_status_ok();

        let other = storefront
            .server
            .get(&format!("/orders/{}", order_id))
            .add_header("x-tenant-id", storefront.tenant())
            .add_header("x-client-id", Uuid::new_v4().to_string())
            .await;
        other.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_closed_window_rejects_and_keeps_draft() {
        let storefront = Storefront::new();
        storefront.add_listed(storefront.oil, 2).await.assert_status_ok();

        storefront
            .admin_patch(json!({
                "timeControlEnabled": true,
                "policy": {"type": "daily", "settings": {"dailyHours": 0}}
            }))
            .await
            .assert_status_ok();

        let response = storefront.submit().await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body["reason"], "window-closed");
        assert_eq!(body["code"], "WINDOW_CLOSED");
        assert_eq!(body["details"]["advisory"], "Ordering is currently closed.");

        let draft = storefront.draft().await;
        assert_eq!(draft["draft"]["items"][0]["quantity"], 2);
    }

    #[tokio::test]
    async fn test_disabling_time_control_reopens_submission() {
        let storefront = Storefront::new();
        storefront.add_listed(storefront.oil, 1).await.assert_status_ok();
        storefront
            .admin_patch(json!({
                "timeControlEnabled": true,
                "policy": {"type": "daily", "settings": {"dailyHours": 0}}
            }))
            .await
            .assert_status_ok();
        storefront.submit().await.assert_status(StatusCode::FORBIDDEN);

        storefront
            .admin_patch(json!({"timeControlEnabled": false}))
            .await
            .assert_status_ok();
        storefront.submit().await.assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_weekly_window_closes_after_end_time() {
        let storefront = Storefront::new();
        storefront.add_listed(storefront.oil, 1).await.assert_status_ok();

        // 2025-03-10 is a Monday; the window ends Monday 17:00
        storefront
            .admin_patch(json!({
                "timeControlEnabled": true,
                "policy": {
                    "type": "weekly",
                    "settings": {"startDay": "monday", "endDay": "monday", "endHour": 17, "endMinute": 0}
                }
            }))
            .await
            .assert_status_ok();

        storefront
            .clock
            .set(Utc.with_ymd_and_hms(2025, 3, 10, 18, 0, 0).unwrap());
        storefront.submit().await.assert_status(StatusCode::FORBIDDEN);

        storefront
            .clock
            .set(Utc.with_ymd_and_hms(2025, 3, 17, 10, 0, 0).unwrap());
        storefront.submit().await.assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_stock_recheck_at_submit() {
        let storefront = Storefront::new();
        storefront.add_listed(storefront.flour, 3).await.assert_status_ok();

        storefront
            .catalog
            .set_stock(storefront.tenant_id, storefront.flour, 1)
            .unwrap();

        let response = storefront.submit().await;
        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["reason"], "out-of-stock");

        assert_eq!(storefront.draft().await["draft"]["items"][0]["quantity"], 3);
        assert_eq!(storefront.catalog.restock_flags().unwrap().len(), 1);
    }
}

// =============================================================================
// Admin control
// =============================================================================

mod control_tests {
    use super::*;

    async fn client_control(storefront: &Storefront) -> Value {
        let response = storefront
            .server
            .get("/order-control")
            .add_header("x-tenant-id", storefront.tenant())
            .add_header("x-client-id", storefront.client())
            .await;
        response.assert_status_ok();
        response.json()
    }

    #[tokio::test]
    async fn test_defaults_before_any_change() {
        let storefront = Storefront::new();

        let body = client_control(&storefront).await;
        assert_eq!(body["state"]["timeControlEnabled"], false);
        assert_eq!(body["state"]["revision"], 0);
        assert_eq!(body["evaluation"]["open"], true);
        assert!(body["evaluation"]["advisory"].is_null());
    }

    #[tokio::test]
    async fn test_patch_is_visible_to_clients_with_evaluation() {
        let storefront = Storefront::new();

        let response = storefront
            .admin_patch(json!({
                "timeControlEnabled": true,
                "policy": {"type": "daily", "settings": {"dailyHours": 1}}
            }))
            .await;
        response.assert_status_ok();
        let state: Value = response.json();
        assert_eq!(state["revision"], 1);

        let body = client_control(&storefront).await;
        assert_eq!(body["state"]["policy"]["type"], "daily");
        assert_eq!(body["evaluation"]["open"], true);
        assert_eq!(body["evaluation"]["advisory"]["level"], "critical");
        assert_eq!(body["evaluation"]["hoursRemaining"], 1);
    }

    #[tokio::test]
    async fn test_patch_leaves_unmentioned_fields() {
        let storefront = Storefront::new();
        storefront
            .admin_patch(json!({"showQuantity": false}))
            .await
            .assert_status_ok();
        storefront
            .admin_patch(json!({"showSalePrice": false}))
            .await
            .assert_status_ok();

        let body = client_control(&storefront).await;
        assert_eq!(body["state"]["showQuantity"], false);
        assert_eq!(body["state"]["showSalePrice"], false);
        assert_eq!(body["state"]["revision"], 2);
    }

    #[tokio::test]
    async fn test_policy_can_be_cleared_with_null() {
        let storefront = Storefront::new();
        storefront
            .admin_patch(json!({"policy": {"type": "daily", "settings": {"dailyHours": 5}}}))
            .await
            .assert_status_ok();

        let response = storefront.admin_patch(json!({"policy": null})).await;
        response.assert_status_ok();
        let state: Value = response.json();
        assert!(state["policy"].is_null());
    }

    #[tokio::test]
    async fn test_empty_patch_is_rejected() {
        let storefront = Storefront::new();

        let response = storefront.admin_patch(json!({})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "EMPTY_PATCH");
    }

    #[tokio::test]
    async fn test_invalid_policy_is_rejected() {
        let storefront = Storefront::new();

        let response = storefront
            .admin_patch(json!({"policy": {"type": "monthly", "settings": {"endDay": 32}}}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_POLICY");
        assert_eq!(body["reason"], "validation");

        let body = client_control(&storefront).await;
        assert_eq!(body["state"]["revision"], 0);
    }

    #[tokio::test]
    async fn test_custom_message_lifecycle() {
        let storefront = Storefront::new();

        let response = storefront
            .server
            .put("/admin/order-control/message")
            .add_header("x-tenant-id", storefront.tenant())
            .add_header("x-admin-id", storefront.admin())
            .json(&json!({"message": "Closed Friday for inventory", "durationMinutes": 60}))
            .await;
        response.assert_status_ok();

        let body = client_control(&storefront).await;
        assert_eq!(body["state"]["customMessage"], "Closed Friday for inventory");
        assert_eq!(body["state"]["customMessageActive"], true);

        storefront.clock.advance(Duration::minutes(61));
        let body = client_control(&storefront).await;
        assert_eq!(body["state"]["customMessageActive"], false);

        let response = storefront
            .server
            .delete("/admin/order-control/message")
            .add_header("x-tenant-id", storefront.tenant())
            .add_header("x-admin-id", storefront.admin())
            .await;
        response.assert_status_ok();
        let state: Value = response.json();
        assert!(state["customMessage"].is_null());
    }

    #[tokio::test]
    async fn test_empty_custom_message_is_rejected() {
        let storefront = Storefront::new();

        let response = storefront
            .server
            .put("/admin/order-control/message")
            .add_header("x-tenant-id", storefront.tenant())
            .add_header("x-admin-id", storefront.admin())
            .json(&json!({"message": ""}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reset_restores_defaults_and_bumps_revision() {
        let storefront = Storefront::new();
        storefront
            .admin_patch(json!({"showSalePrice": false, "timeControlEnabled": true}))
            .await
            .assert_status_ok();

        let response = storefront
            .server
            .post("/admin/order-control/reset")
            .add_header("x-tenant-id", storefront.tenant())
            .add_header("x-admin-id", storefront.admin())
            .await;
        response.assert_status_ok();

        let state: Value = response.json();
        assert_eq!(state["showSalePrice"], true);
        assert_eq!(state["timeControlEnabled"], false);
        assert_eq!(state["revision"], 2);
    }

    #[tokio::test]
    async fn test_tenants_are_isolated() {
        let storefront = Storefront::new();
        storefront
            .admin_patch(json!({"showSalePrice": false}))
            .await
            .assert_status_ok();

        let response = storefront
            .server
            .get("/admin/order-control")
            .add_header("x-tenant-id", Uuid::new_v4().to_string())
            .add_header("x-admin-id", storefront.admin())
            .await;
        response.assert_status_ok();
        let state: Value = response.json();
        assert_eq!(state["showSalePrice"], true);
        assert_eq!(state["revision"], 0);
    }
}
