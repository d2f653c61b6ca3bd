#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use docvault_api::auth::jwt::{generate_access_token, JwtConfig};
use docvault_api::auth::password::hash_password;
use docvault_api::config::{ServerConfig, StorageConfig};
use docvault_api::router::build_app_router;
use docvault_api::state::AppState;
use docvault_core::storage::LocalDisk;
use docvault_db::models::user::{CreateUser, User};
use docvault_db::repositories::{RoleRepo, UserRepo};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "test-password-123";

/// A minimal valid PDF body.
pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj << >> endobj\ntrailer << >>\n%%EOF\n";

/// Build a test `ServerConfig` with safe defaults and storage under `root`.
pub fn test_config(root: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-with-enough-length".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        storage: StorageConfig {
            root: root.to_path_buf(),
            max_upload_bytes: 1024 * 1024,
            split_temp_ttl_mins: 60,
        },
    }
}

/// The application under test plus the handles tests need to poke at it.
pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
    pub config: ServerConfig,
    pub storage: LocalDisk,
    /// Kept alive for the duration of the test.
    pub storage_dir: TempDir,
}

/// Build the full application router over `pool` with a temporary storage
/// root. The legacy tables come from the `legacy` fixture on the same pool.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let storage_dir = tempfile::tempdir().expect("temp storage dir");
    let config = test_config(storage_dir.path());
    let storage = LocalDisk::new(storage_dir.path());

    let state = AppState {
        pool: pool.clone(),
        legacy_pool: pool.clone(),
        config: Arc::new(config.clone()),
        storage: Arc::new(storage.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        pool,
        config,
        storage,
        storage_dir,
    }
}

impl TestApp {
    /// Create a user with `role` and return it with a valid access token.
    pub async fn user(
        &self,
        username: &str,
        role: &str,
        vendor_code: Option<&str>,
        zones: &[&str],
    ) -> (User, String) {
        let role_row = RoleRepo::find_by_name(&self.pool, role)
            .await
            .unwrap()
            .expect("seeded role");
        let input = CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            role_id: role_row.id,
            vendor_code: vendor_code.map(str::to_string),
            zones: zones.iter().map(|z| z.to_string()).collect(),
        };
        let user = UserRepo::create(&self.pool, &input).await.unwrap();
        let token = generate_access_token(user.id, role, &self.config.jwt).unwrap();
        (user, token)
    }

    pub async fn admin(&self) -> String {
        self.user("admin", "admin", None, &[]).await.1
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(request(Method::GET, uri, Some(token), Body::empty(), None))
            .await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(request(Method::DELETE, uri, Some(token), Body::empty(), None))
            .await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Response<Body> {
        self.send(request(
            Method::POST,
            uri,
            token,
            Body::from(body.to_string()),
            Some("application/json".to_string()),
        ))
        .await
    }

    pub async fn put_json(&self, uri: &str, token: &str, body: serde_json::Value) -> Response<Body> {
        self.send(request(
            Method::PUT,
            uri,
            Some(token),
            Body::from(body.to_string()),
            Some("application/json".to_string()),
        ))
        .await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        token: &str,
        parts: &[FormPart<'_>],
    ) -> Response<Body> {
        let (content_type, body) = multipart_body(parts);
        self.send(request(
            Method::POST,
            uri,
            Some(token),
            Body::from(body),
            Some(content_type),
        ))
        .await
    }
}

fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Body,
    content_type: Option<String>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    if let Some(content_type) = content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    builder.body(body).unwrap()
}

/// One field of a `multipart/form-data` body.
pub enum FormPart<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

/// Encode `parts` as `multipart/form-data`, returning the content type and body.
pub fn multipart_body(parts: &[FormPart<'_>]) -> (String, Vec<u8>) {
    let boundary = "docvault-test-boundary";
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match part {
            FormPart::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            FormPart::File(name, filename, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/pdf\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

/// Collect a response body into bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
