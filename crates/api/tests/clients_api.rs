//! HTTP-level tests for client listing and zone/vendor scoping.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app};
use sqlx::PgPool;

fn codes(json: &serde_json::Value) -> Vec<String> {
    json["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["code"].as_str().unwrap().to_string())
        .collect()
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_admin_sees_every_client(pool: PgPool) {
    let app = build_test_app(pool);
    let token = app.admin().await;

    let json = body_json(app.get("/api/v1/clients", &token).await).await;
    assert_eq!(json["data"]["total_count"], 4);
    assert_eq!(json["data"]["limit"], 25);
    assert_eq!(json["data"]["offset"], 0);
    assert_eq!(codes(&json).len(), 4);
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_staff_sees_clients_of_their_zones(pool: PgPool) {
    let app = build_test_app(pool);
    let (_, token) = app.user("north", "staff", None, &["NORTE"]).await;

    let response = app.get("/api/v1/clients", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(codes(&json), vec!["C001", "C003"]);
    assert_eq!(json["data"]["total_count"], 2);
    assert_eq!(
        json["data"]["items"][0]["segment_description"],
        "Zona Norte - Mayoristas"
    );
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_staff_without_zones_sees_nothing(pool: PgPool) {
    let app = build_test_app(pool);
    let (_, token) = app.user("nozone", "staff", None, &[]).await;

    let json = body_json(app.get("/api/v1/clients", &token).await).await;
    assert_eq!(json["data"]["total_count"], 0);
    assert!(codes(&json).is_empty());
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_vendor_sees_own_clients(pool: PgPool) {
    let app = build_test_app(pool);
    let (_, token) = app.user("pampa", "vendor", Some("V02"), &[]).await;

    let json = body_json(app.get("/api/v1/clients", &token).await).await;
    assert_eq!(codes(&json), vec!["C004", "C002"]);
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_search_and_pagination(pool: PgPool) {
    let app = build_test_app(pool);
    let token = app.admin().await;

    let json = body_json(app.get("/api/v1/clients?search=austral", &token).await).await;
    assert_eq!(codes(&json), vec!["C002"]);

    let json = body_json(app.get("/api/v1/clients?search=33333333", &token).await).await;
    assert_eq!(codes(&json), vec!["C003"]);

    let json = body_json(app.get("/api/v1/clients?limit=2&offset=1", &token).await).await;
    assert_eq!(json["data"]["total_count"], 4);
    assert_eq!(json["data"]["limit"], 2);
    assert_eq!(codes(&json).len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_get_client_enforces_scope(pool: PgPool) {
    let app = build_test_app(pool);
    let (_, token) = app.user("north", "staff", None, &["NORTE"]).await;

    let response = app.get("/api/v1/clients/C001", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Almacen El Faro");

    let response = app.get("/api/v1/clients/C002", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get("/api/v1/clients/NOPE", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_vendors_list_is_admin_only(pool: PgPool) {
    let app = build_test_app(pool);
    let admin = app.admin().await;
    let (_, staff) = app.user("north", "staff", None, &["NORTE"]).await;

    let response = app.get("/api/v1/vendors", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert_eq!(json["data"][0]["code"], "V02");

    let response = app.get("/api/v1/vendors", &staff).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
