//! Integration tests for notification routing, the `/notifications`
//! endpoints and the document expiry sweep.

mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{
    body_json, build_test_app, create_user, decide, get, post_json, upload_pdf, user_with_token,
};
use ecodeli_api::background::{document_reminders, expiry_sweep};
use ecodeli_api::notifications::NotificationRouter;
use ecodeli_core::documents::DocumentType;
use ecodeli_core::requirements::RequirementCatalog;
use ecodeli_core::roles::UserRole;
use ecodeli_events::bus::{event_types, PlatformEvent};
use ecodeli_events::EventBus;
use serde_json::json;
use sqlx::PgPool;

async fn notification_count(pool: &PgPool, user_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Test: routing events to in-app notifications
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_review_event_becomes_in_app_notification(pool: PgPool) {
    let user = create_user(&pool, "Nora Notified", UserRole::Deliverer).await;
    let router = NotificationRouter::new(pool.clone(), None);

    let event = PlatformEvent::new(event_types::DOCUMENT_REVIEWED).with_payload(json!({
        "user_id": user.id,
        "document_type": "INSURANCE",
        "status": "REJECTED",
        "reason": "Expired policy",
    }));
    router.route_event(&event).await.unwrap();

    let (channel, kind, title, message, delivered): (String, String, String, String, bool) =
        sqlx::query_as(
            "SELECT channel, kind, title, message, is_delivered FROM notifications WHERE user_id = $1",
        )
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(channel, "in_app");
    assert_eq!(kind, "document.reviewed");
    assert_eq!(title, "Document rejected");
    assert!(message.contains("insurance"));
    assert!(message.contains("Expired policy"));
    assert!(delivered);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_events_without_text_or_recipient_are_skipped(pool: PgPool) {
    let user = create_user(&pool, "Quiet User", UserRole::Deliverer).await;
    let router = NotificationRouter::new(pool.clone(), None);

    let no_recipient = PlatformEvent::new(event_types::DOCUMENT_UPLOADED)
        .with_payload(json!({ "document_type": "ID_CARD" }));
    router.route_event(&no_recipient).await.unwrap();

    let unknown = PlatformEvent::new("user.login").with_payload(json!({ "user_id": user.id }));
    router.route_event(&unknown).await.unwrap();

    assert_eq!(notification_count(&pool, user.id).await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_router_consumes_bus_until_closed(pool: PgPool) {
    let user = create_user(&pool, "Bus Rider", UserRole::Deliverer).await;
    let bus = EventBus::default();
    let handle = tokio::spawn(NotificationRouter::new(pool.clone(), None).run(bus.subscribe()));

    bus.publish(
        PlatformEvent::new(event_types::ROLE_ACTIVATED)
            .with_payload(json!({ "user_id": user.id, "role": "DELIVERER" })),
    );
    drop(bus);
    handle.await.unwrap();

    let title: String = sqlx::query_scalar("SELECT title FROM notifications WHERE user_id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(title, "Account verified");
}

// ---------------------------------------------------------------------------
// Test: /notifications endpoints
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_count_and_mark_read(pool: PgPool) {
    let app = build_test_app(pool.clone()).await;
    let (user, token) = user_with_token(&pool, "Rita Reader", UserRole::Deliverer).await;
    let (_other, other_token) = user_with_token(&pool, "Other Reader", UserRole::Deliverer).await;
    let router = NotificationRouter::new(pool.clone(), None);

    for document_type in ["ID_CARD", "INSURANCE"] {
        router
            .route_event(
                &PlatformEvent::new(event_types::DOCUMENT_REVIEWED).with_payload(json!({
                    "user_id": user.id,
                    "document_type": document_type,
                    "status": "APPROVED",
                })),
            )
            .await
            .unwrap();
    }

    let response = get(app.router(), "/api/v1/notifications", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    // Newest first.
    assert_eq!(items[0]["message"], "Your insurance has been approved.");
    let first_id = items[1]["id"].as_i64().unwrap();

    let json = body_json(get(app.router(), "/api/v1/notifications/unread-count", &token).await)
        .await;
    assert_eq!(json["data"]["unread_count"], 2);

    let read_uri = format!("/api/v1/notifications/{first_id}/read");

    // Someone else's notification is invisible.
    let response = post_json(app.router(), &read_uri, &other_token, json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json(app.router(), &read_uri, &token, json!({})).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(app.router(), &read_uri, &token, json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(get(app.router(), "/api/v1/notifications/unread-count", &token).await)
        .await;
    assert_eq!(json["data"]["unread_count"], 1);

    let json = body_json(
        get(
            app.router(),
            "/api/v1/notifications?unread_only=true&limit=10",
            &token,
        )
        .await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Test: expiry sweep
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_expired_document_is_announced_once(pool: PgPool) {
    let app = build_test_app(pool.clone()).await;
    let (user, token) = user_with_token(&pool, "Ex Pired", UserRole::Deliverer).await;
    let (_admin, admin_token) = user_with_token(&pool, "Ada Admin", UserRole::Admin).await;

    let approved = upload_pdf(app.router(), &token, DocumentType::Insurance).await;
    decide(app.router(), &admin_token, approved, "APPROVED", None).await;
    let pending = upload_pdf(app.router(), &token, DocumentType::IdCard).await;

    sqlx::query("UPDATE documents SET expires_at = NOW() - INTERVAL '1 day' WHERE id = ANY($1)")
        .bind(vec![approved, pending])
        .execute(&pool)
        .await
        .unwrap();

    let bus = EventBus::default();
    let mut events = bus.subscribe();

    let notified = expiry_sweep::sweep_once(&pool, &bus, Utc::now()).await.unwrap();
    assert_eq!(notified, 1);

    let event = events.try_recv().unwrap();
    assert_eq!(event.event_type, event_types::DOCUMENT_EXPIRED);
    assert_eq!(event.recipient_id(), Some(user.id));
    assert_eq!(event.payload["document_id"], approved);
    assert_eq!(event.payload["document_type"], "INSURANCE");

    let notified = expiry_sweep::sweep_once(&pool, &bus, Utc::now()).await.unwrap();
    assert_eq!(notified, 0);
    assert!(events.try_recv().is_err());

    let audited: Vec<i64> = sqlx::query_scalar(
        "SELECT entity_id FROM audit_logs \
         WHERE action = 'document.expired' AND performed_by_id IS NULL",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(audited, vec![approved]);

    let json = body_json(get(app.router(), "/api/v1/profile/verification", &token).await).await;
    assert_eq!(
        json["data"]["summary"]["expired_types"],
        json!(["INSURANCE"])
    );
}

// ---------------------------------------------------------------------------
// Test: missing documents reminders
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_reminders_go_to_incomplete_users_once_per_cooldown(pool: PgPool) {
    let app = build_test_app(pool.clone()).await;
    let (deliverer, token) = user_with_token(&pool, "Dee Incomplete", UserRole::Deliverer).await;
    let merchant = create_user(&pool, "Mia Merchant", UserRole::Merchant).await;
    create_user(&pool, "Cal Client", UserRole::Client).await;
    let (_admin, admin_token) = user_with_token(&pool, "Ada Admin", UserRole::Admin).await;

    let id = upload_pdf(app.router(), &token, DocumentType::IdCard).await;
    decide(app.router(), &admin_token, id, "APPROVED", None).await;

    let catalog = RequirementCatalog::default();
    let bus = EventBus::default();
    let mut events = bus.subscribe();
    let now = Utc::now();

    let reminded = document_reminders::remind_pending(&pool, &bus, &catalog, now)
        .await
        .unwrap();
    assert_eq!(reminded, 2);

    let first = events.try_recv().unwrap();
    assert_eq!(first.event_type, event_types::DOCUMENTS_MISSING);
    assert_eq!(first.recipient_id(), Some(deliverer.id));
    assert_eq!(
        first.payload["missing_types"],
        json!(["DRIVING_LICENSE", "VEHICLE_REGISTRATION", "INSURANCE"])
    );
    let second = events.try_recv().unwrap();
    assert_eq!(second.recipient_id(), Some(merchant.id));
    assert!(events.try_recv().is_err());

    // Within the cooldown nobody is reminded again.
    let reminded = document_reminders::remind_pending(&pool, &bus, &catalog, now)
        .await
        .unwrap();
    assert_eq!(reminded, 0);

    let later = now + chrono::Duration::days(document_reminders::REMIND_COOLDOWN_DAYS + 1);
    let reminded = document_reminders::remind_pending(&pool, &bus, &catalog, later)
        .await
        .unwrap();
    assert_eq!(reminded, 2);

    NotificationRouter::new(pool.clone(), None)
        .route_event(&first)
        .await
        .unwrap();
    let message: String = sqlx::query_scalar(
        "SELECT message FROM notifications WHERE user_id = $1 AND kind = 'documents.missing'",
    )
    .bind(deliverer.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(
        message,
        "Your deliverer account is not active yet. \
         Still needed: driving license, vehicle registration, insurance."
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_can_send_a_reminder(pool: PgPool) {
    let app = build_test_app(pool.clone()).await;
    let merchant = create_user(&pool, "Rem Merchant", UserRole::Merchant).await;
    let client = create_user(&pool, "Rem Client", UserRole::Client).await;
    let (_admin, admin_token) = user_with_token(&pool, "Ada Admin", UserRole::Admin).await;
    let mut events = app.event_bus().subscribe();

    let response = post_json(
        app.router(),
        &format!("/api/v1/admin/users/{}/verification/remind", merchant.id),
        &admin_token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["reminded"], true);
    assert_eq!(
        json["data"]["summary"]["missing_types"],
        json!(["ID_CARD", "BUSINESS_REGISTRATION", "PROOF_OF_ADDRESS"])
    );

    let event = events.try_recv().unwrap();
    assert_eq!(event.event_type, event_types::DOCUMENTS_MISSING);
    assert_eq!(event.recipient_id(), Some(merchant.id));

    let response = post_json(
        app.router(),
        &format!("/api/v1/admin/users/{}/verification/remind", client.id),
        &admin_token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
