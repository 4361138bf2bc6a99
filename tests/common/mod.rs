//! Shared setup for the HTTP tests: an in-memory database and a throwaway upload directory.

#![allow(dead_code)]

use axum::http::{header, HeaderName, HeaderValue};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use clipshare::api::{create_router, App};
use clipshare::auth::Authenticator;
use clipshare::blob::BlobStore;
use clipshare::database::{Database, DatabaseConfig};
use secrecy::SecretString;
use tempfile::TempDir;

pub const SECRET: &str = "test-secret";
pub const EMAIL: &str = "alice@example.com";

pub struct TestApp {
    pub server: TestServer,
    pub uploads: TempDir,
    pub token: String,
}

impl TestApp {
    /// Number of files currently sitting in the upload directory.
    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(self.uploads.path()).unwrap().count()
    }

    pub fn auth(&self) -> (HeaderName, HeaderValue) {
        bearer(&self.token)
    }
}

pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    let value = HeaderValue::from_str(&format!("Bearer {token}")).unwrap();
    (header::AUTHORIZATION, value)
}

pub fn authenticator() -> Authenticator {
    Authenticator::new(SecretString::new(SECRET.to_string()))
}

pub async fn app(max_upload_bytes: u64) -> (App, TempDir) {
    let uploads = TempDir::new().unwrap();
    let database = Database::connect(&DatabaseConfig::memory().unwrap()).await.unwrap();
    let blobs = BlobStore::open(uploads.path(), max_upload_bytes).await.unwrap();

    (App::new(database, authenticator(), blobs), uploads)
}

pub fn serve(app: App, uploads: TempDir) -> TestApp {
    let server = TestServer::new(create_router(app, None)).unwrap();
    let token = authenticator().issue(EMAIL).unwrap();

    TestApp { server, uploads, token }
}

pub async fn setup() -> TestApp {
    setup_with_limit(50 * 1024 * 1024).await
}

pub async fn setup_with_limit(max_upload_bytes: u64) -> TestApp {
    let (app, uploads) = app(max_upload_bytes).await;
    serve(app, uploads)
}

pub fn video_form(filename: &str, content: &[u8]) -> MultipartForm {
    let part = Part::bytes(content.to_vec())
        .file_name(filename.to_string())
        .mime_type("application/octet-stream");

    MultipartForm::new().add_part("file", part)
}
