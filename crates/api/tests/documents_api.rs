//! HTTP-level tests for document upload, listing, download and lifecycle.

mod common;

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use common::{body_bytes, body_json, build_test_app, FormPart, TestApp, PDF_BYTES};
use docvault_core::storage::StorageDisk;
use docvault_db::repositories::DocumentRepo;
use serde_json::json;
use sqlx::PgPool;

async fn upload(app: &TestApp, token: &str, client: &str, title: &str) -> serde_json::Value {
    let response = app
        .post_multipart(
            "/api/v1/documents",
            token,
            &[
                FormPart::Text("client_code", client),
                FormPart::Text("title", title),
                FormPart::File("file", "scan.pdf", PDF_BYTES),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_staff_uploads_pdf_for_client_in_zone(pool: PgPool) {
    let app = build_test_app(pool);
    let (user, token) = app.user("north", "staff", None, &["NORTE"]).await;

    let json = upload(&app, &token, "C001", "Factura 1").await;
    let data = &json["data"];
    assert_eq!(data["client_code"], "C001");
    assert_eq!(data["title"], "Factura 1");
    assert_eq!(data["original_filename"], "scan.pdf");
    assert_eq!(data["mime_type"], "application/pdf");
    assert_eq!(data["file_size_bytes"], PDF_BYTES.len());
    assert_eq!(data["uploaded_by"], user.id);
    assert!(data.get("storage_path").is_none());

    let id = data["id"].as_i64().unwrap();
    let document = DocumentRepo::find_by_id(&app.pool, id).await.unwrap().unwrap();
    assert!(document.storage_path.starts_with("documents/C001/"));
    assert_eq!(app.storage.get(&document.storage_path).await.unwrap(), PDF_BYTES);
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_title_defaults_to_file_name(pool: PgPool) {
    let app = build_test_app(pool);
    let token = app.admin().await;

    let response = app
        .post_multipart(
            "/api/v1/documents",
            &token,
            &[
                FormPart::Text("client_code", "C002"),
                FormPart::File("file", "Remito 0042.pdf", PDF_BYTES),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Remito 0042");
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_upload_rejections(pool: PgPool) {
    let app = build_test_app(pool);
    let (_, staff) = app.user("north", "staff", None, &["NORTE"]).await;
    let (_, vendor) = app.user("andes", "vendor", Some("V01"), &[]).await;

    // Not a PDF.
    let response = app
        .post_multipart(
            "/api/v1/documents",
            &staff,
            &[
                FormPart::Text("client_code", "C001"),
                FormPart::File("file", "notes.pdf", b"plain text"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Missing file.
    let response = app
        .post_multipart(
            "/api/v1/documents",
            &staff,
            &[FormPart::Text("client_code", "C001")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Client outside the staff user's zones.
    let response = app
        .post_multipart(
            "/api/v1/documents",
            &staff,
            &[
                FormPart::Text("client_code", "C002"),
                FormPart::File("file", "a.pdf", PDF_BYTES),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Unknown client.
    let response = app
        .post_multipart(
            "/api/v1/documents",
            &staff,
            &[
                FormPart::Text("client_code", "ZZZ"),
                FormPart::File("file", "a.pdf", PDF_BYTES),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Unknown category.
    let response = app
        .post_multipart(
            "/api/v1/documents",
            &staff,
            &[
                FormPart::Text("client_code", "C001"),
                FormPart::Text("category_id", "9999"),
                FormPart::File("file", "a.pdf", PDF_BYTES),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Description over 2000 characters.
    let description = "d".repeat(2001);
    let response = app
        .post_multipart(
            "/api/v1/documents",
            &staff,
            &[
                FormPart::Text("client_code", "C001"),
                FormPart::Text("description", &description),
                FormPart::File("file", "a.pdf", PDF_BYTES),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Vendors are read-only.
    let response = app
        .post_multipart(
            "/api/v1/documents",
            &vendor,
            &[
                FormPart::Text("client_code", "C001"),
                FormPart::File("file", "a.pdf", PDF_BYTES),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    assert!(app.storage.list("documents/C001").await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_list_is_scoped_to_visible_clients(pool: PgPool) {
    let app = build_test_app(pool);
    let admin = app.admin().await;
    let (_, north) = app.user("north", "staff", None, &["NORTE"]).await;
    let (_, pampa) = app.user("pampa", "vendor", Some("V02"), &[]).await;

    upload(&app, &admin, "C001", "Norte uno").await;
    upload(&app, &admin, "C003", "Norte tres").await;
    upload(&app, &admin, "C002", "Sur dos").await;

    let json = body_json(app.get("/api/v1/documents", &admin).await).await;
    assert_eq!(json["data"]["total_count"], 3);

    let json = body_json(app.get("/api/v1/documents", &north).await).await;
    assert_eq!(json["data"]["total_count"], 2);
    // Newest first.
    assert_eq!(json["data"]["items"][0]["title"], "Norte tres");

    let json = body_json(app.get("/api/v1/documents", &pampa).await).await;
    assert_eq!(json["data"]["total_count"], 1);
    assert_eq!(json["data"]["items"][0]["client_code"], "C002");

    // Filtering by a client outside the scope yields nothing.
    let json = body_json(app.get("/api/v1/documents?client_code=C002", &north).await).await;
    assert_eq!(json["data"]["total_count"], 0);

    let json = body_json(app.get("/api/v1/documents?search=tres", &admin).await).await;
    assert_eq!(json["data"]["total_count"], 1);

    let response = app.get("/api/v1/clients/C001/documents", &north).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total_count"], 1);
    assert_eq!(json["data"]["items"][0]["title"], "Norte uno");

    let response = app.get("/api/v1/clients/C002/documents", &north).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_download_streams_pdf(pool: PgPool) {
    let app = build_test_app(pool);
    let admin = app.admin().await;
    let (_, pampa) = app.user("pampa", "vendor", Some("V02"), &[]).await;

    let json = upload(&app, &admin, "C001", "Factura Año 1").await;
    let id = json["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/documents/{id}/download");

    let response = app.get(&uri, &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/pdf");
    let disposition = response.headers()[CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"Factura A_o 1.pdf\""));
    assert!(disposition.contains("filename*=UTF-8''Factura%20A%C3%B1o%201.pdf"));
    assert_eq!(body_bytes(response).await, PDF_BYTES);

    // C001 belongs to vendor V01.
    let response = app.get(&uri, &pampa).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_download_missing_file_is_404(pool: PgPool) {
    let app = build_test_app(pool);
    let admin = app.admin().await;

    let json = upload(&app, &admin, "C001", "Borrado").await;
    let id = json["data"]["id"].as_i64().unwrap();
    let document = DocumentRepo::find_by_id(&app.pool, id).await.unwrap().unwrap();
    app.storage.delete(&document.storage_path).await.unwrap();

    let response = app.get(&format!("/api/v1/documents/{id}/download"), &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations", fixtures("legacy"))]
async fn test_update_delete_and_restore(pool: PgPool) {
    let app = build_test_app(pool);
    let admin = app.admin().await;
    let (_, north) = app.user("north", "staff", None, &["NORTE"]).await;
    let (_, andes) = app.user("andes", "vendor", Some("V01"), &[]).await;

    let json = upload(&app, &north, "C001", "Borrador").await;
    let id = json["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/documents/{id}");

    let response = app
        .put_json(&uri, &north, json!({ "title": "  Contrato final ", "description": "firmado" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Contrato final");
    assert_eq!(json["data"]["description"], "firmado");

    let response = app.put_json(&uri, &north, json!({ "title": "   " })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Vendor can read but not change.
    assert_eq!(app.get(&uri, &andes).await.status(), StatusCode::OK);
    let response = app.put_json(&uri, &andes, json!({ "title": "x" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.delete(&uri, &andes).await.status(), StatusCode::FORBIDDEN);

    assert_eq!(app.delete(&uri, &north).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.get(&uri, &north).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.delete(&uri, &north).await.status(), StatusCode::NOT_FOUND);

    // Only admins restore.
    let restore = format!("{uri}/restore");
    let response = app
        .post_json(&restore, Some(north.as_str()), json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.post_json(&restore, Some(admin.as_str()), json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.get(&uri, &north).await.status(), StatusCode::OK);

    let response = app.post_json(&restore, Some(admin.as_str()), json!({})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .post_json("/api/v1/documents/999999/restore", Some(admin.as_str()), json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
