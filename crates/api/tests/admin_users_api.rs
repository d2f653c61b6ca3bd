//! HTTP-level tests for admin user management.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, FormPart, PDF_BYTES, TEST_PASSWORD};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_create_users_per_role(pool: PgPool) {
    let app = build_test_app(pool);
    let admin = app.admin().await;

    let response = app
        .post_json(
            "/api/v1/admin/users",
            Some(admin.as_str()),
            json!({
                "username": "sur",
                "email": "sur@example.com",
                "password": "long-enough",
                "role": "staff",
                "zones": [" sur ", "SUR", "gran  buenos aires"]
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "staff");
    assert_eq!(json["data"]["zones"], json!(["SUR", "GRAN BUENOS AIRES"]));

    // Vendors need an existing vendor code.
    let vendor = json!({
        "username": "andes",
        "email": "andes@example.com",
        "password": "long-enough",
        "role": "vendor"
    });
    let response = app
        .post_json("/api/v1/admin/users", Some(admin.as_str()), vendor.clone())
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let mut unknown = vendor.clone();
    unknown["vendor_code"] = json!("V99");
    let response = app
        .post_json("/api/v1/admin/users", Some(admin.as_str()), unknown)
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let mut known = vendor;
    known["vendor_code"] = json!("V01");
    let response = app
        .post_json("/api/v1/admin/users", Some(admin.as_str()), known)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["vendor_code"], "V01");

    // New users can log in.
    let response = app
        .post_json(
            "/api/v1/auth/login",
            None,
            json!({ "username": "andes", "password": "long-enough" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_create_user_rejections(pool: PgPool) {
    let app = build_test_app(pool);
    let admin = app.admin().await;
    let (_, staff) = app.user("north", "staff", None, &["NORTE"]).await;

    let body = json!({
        "username": "nuevo",
        "email": "nuevo@example.com",
        "password": "long-enough",
        "role": "staff"
    });

    let response = app
        .post_json("/api/v1/admin/users", Some(staff.as_str()), body.clone())
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let mut bad_role = body.clone();
    bad_role["role"] = json!("superuser");
    let response = app
        .post_json("/api/v1/admin/users", Some(admin.as_str()), bad_role)
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let mut short = body.clone();
    short["password"] = json!("short");
    let response = app
        .post_json("/api/v1/admin/users", Some(admin.as_str()), short)
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(json["fields"]["password"].is_array());

    let response = app
        .post_json("/api/v1/admin/users", Some(admin.as_str()), body.clone())
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .post_json("/api/v1/admin/users", Some(admin.as_str()), body)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_update_zones_changes_scope_immediately(pool: PgPool) {
    let app = build_test_app(pool);
    let admin = app.admin().await;
    let (user, staff) = app.user("north", "staff", None, &["NORTE"]).await;

    assert_eq!(
        app.get("/api/v1/clients/C002", &staff).await.status(),
        StatusCode::FORBIDDEN
    );

    let response = app
        .put_json(
            &format!("/api/v1/admin/users/{}", user.id),
            &admin,
            json!({ "zones": ["sur"] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["zones"], json!(["SUR"]));

    // Same token, new scope.
    assert_eq!(
        app.get("/api/v1/clients/C002", &staff).await.status(),
        StatusCode::OK
    );
    assert_eq!(
        app.get("/api/v1/clients/C001", &staff).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_role_change_applies_to_existing_token(pool: PgPool) {
    let app = build_test_app(pool);
    let admin = app.admin().await;
    let (user, staff) = app.user("north", "staff", None, &["NORTE"]).await;

    let login = app
        .post_json(
            "/api/v1/auth/login",
            None,
            json!({ "username": "north", "password": TEST_PASSWORD }),
        )
        .await;
    assert_eq!(login.status(), StatusCode::OK);
    let refresh_token = body_json(login).await["refresh_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .put_json(
            &format!("/api/v1/admin/users/{}", user.id),
            &admin,
            json!({ "role": "vendor", "vendor_code": "V01" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The token still says staff; the stored role is vendor, which is read-only.
    let response = app
        .post_multipart(
            "/api/v1/documents",
            &staff,
            &[
                FormPart::Text("client_code", "C001"),
                FormPart::File("file", "scan.pdf", PDF_BYTES),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Scope follows the vendor code, not the old zones.
    assert_eq!(
        app.get("/api/v1/clients/C001", &staff).await.status(),
        StatusCode::OK
    );
    assert_eq!(
        app.get("/api/v1/clients/C002", &staff).await.status(),
        StatusCode::FORBIDDEN
    );

    // Sessions opened under the old role are gone.
    let response = app
        .post_json(
            "/api/v1/auth/refresh",
            None,
            json!({ "refresh_token": refresh_token }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_demoted_admin_loses_admin_routes(pool: PgPool) {
    let app = build_test_app(pool);
    let root = app.admin().await;
    let (other, other_token) = app.user("segundo", "admin", None, &[]).await;

    assert_eq!(
        app.get("/api/v1/admin/users", &other_token).await.status(),
        StatusCode::OK
    );

    let response = app
        .put_json(
            &format!("/api/v1/admin/users/{}", other.id),
            &root,
            json!({ "role": "staff", "zones": ["NORTE"] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        app.get("/api/v1/admin/users", &other_token).await.status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        app.get("/api/v1/vendors", &other_token).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_leaving_vendor_role_clears_vendor_code(pool: PgPool) {
    let app = build_test_app(pool);
    let admin = app.admin().await;
    let (user, token) = app.user("andes", "vendor", Some("V01"), &[]).await;

    let response = app
        .put_json(
            &format!("/api/v1/admin/users/{}", user.id),
            &admin,
            json!({ "role": "staff", "zones": ["norte"] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "staff");
    assert!(json["data"]["vendor_code"].is_null());

    let me = body_json(app.get("/api/v1/auth/me", &token).await).await;
    assert!(me["data"]["vendor_code"].is_null());

    // A vendor code sent for a non-vendor user is ignored.
    let response = app
        .put_json(
            &format!("/api/v1/admin/users/{}", user.id),
            &admin,
            json!({ "vendor_code": "V02" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"]["vendor_code"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_deactivate_and_list(pool: PgPool) {
    let app = build_test_app(pool);
    let (admin_user, admin) = app.user("root", "admin", None, &[]).await;
    let (user, staff) = app.user("north", "staff", None, &["NORTE"]).await;

    let response = app
        .delete(&format!("/api/v1/admin/users/{}", admin_user.id), &admin)
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let uri = format!("/api/v1/admin/users/{}", user.id);
    assert_eq!(app.delete(&uri, &admin).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.delete(&uri, &admin).await.status(), StatusCode::NOT_FOUND);

    // A deactivated user's token no longer opens scoped endpoints.
    assert_eq!(
        app.get("/api/v1/clients", &staff).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let json = body_json(app.get("/api/v1/admin/users", &admin).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let json = body_json(
        app.get("/api/v1/admin/users?include_inactive=true", &admin)
            .await,
    )
    .await;
    let names: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["north", "root"]);

    let response = app.get(&uri, &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_active"], false);
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_reset_password(pool: PgPool) {
    let app = build_test_app(pool);
    let admin = app.admin().await;
    let (user, _) = app.user("north", "staff", None, &["NORTE"]).await;

    let uri = format!("/api/v1/admin/users/{}/reset-password", user.id);
    let response = app
        .post_json(&uri, Some(admin.as_str()), json!({ "new_password": "brand-new-secret" }))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .post_json(
            "/api/v1/auth/login",
            None,
            json!({ "username": "north", "password": TEST_PASSWORD }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .post_json(
            "/api/v1/auth/login",
            None,
            json!({ "username": "north", "password": "brand-new-secret" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .post_json(
            "/api/v1/admin/users/999999/reset-password",
            Some(admin.as_str()),
            json!({ "new_password": "brand-new-secret" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
