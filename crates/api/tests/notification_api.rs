//! HTTP-level integration tests for the notification inbox.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, create_user, get_auth, post_auth, token_for};
use civicdesk_core::roles::Role;
use civicdesk_db::repositories::NotificationRepo;
use sqlx::PgPool;

/// Users see only their own notifications, and unread filtering works.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_scoped_to_user(pool: PgPool) {
    let officer = create_user(&pool, "officer_atieno", Role::Officer).await;
    let other = create_user(&pool, "officer_other", Role::Officer).await;

    NotificationRepo::create(&pool, officer.id, "New ticket assigned: Portal error")
        .await
        .unwrap();
    NotificationRepo::create(&pool, other.id, "New ticket assigned: Lost form")
        .await
        .unwrap();

    let app = build_test_app(pool);
    let response = get_auth(
        app,
        "/api/v1/notifications",
        &token_for(officer.id, Role::Officer),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["message"], "New ticket assigned: Portal error");
    assert_eq!(rows[0]["is_read"], false);
}

/// Mark-read flows: single, foreign (404), all, and the unread counter.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_mark_read_flows(pool: PgPool) {
    let officer = create_user(&pool, "officer_atieno", Role::Officer).await;
    let other = create_user(&pool, "officer_other", Role::Officer).await;

    let first = NotificationRepo::create(&pool, officer.id, "first").await.unwrap();
    NotificationRepo::create(&pool, officer.id, "second").await.unwrap();
    let foreign = NotificationRepo::create(&pool, other.id, "not yours").await.unwrap();

    let app = build_test_app(pool);
    let token = token_for(officer.id, Role::Officer);

    let response = get_auth(app.clone(), "/api/v1/notifications/unread-count", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["count"], 2);

    // Mark one read.
    let response = post_auth(
        app.clone(),
        &format!("/api/v1/notifications/{}/read", first.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Someone else's notification is a 404.
    let response = post_auth(
        app.clone(),
        &format!("/api/v1/notifications/{}/read", foreign.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Mark the rest.
    let response = post_auth(app.clone(), "/api/v1/notifications/read-all", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["marked_read"], 1);

    let response = get_auth(app, "/api/v1/notifications/unread-count", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["count"], 0);
}
