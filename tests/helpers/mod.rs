//! Test helpers: build an isolated app (temp data and assets dirs) and
//! register users through the API.

#![allow(dead_code)]

use axum::http::StatusCode;
use axum_test::multipart::Part;
use axum_test::TestServer;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tubely::config::Config;
use tubely::models::Video;
use tubely::{router, AppState};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-integration-tests";
pub const TEST_PASSWORD: &str = "TestPassword123!";
pub const TEST_PORT: u16 = 8091;

/// PNG signature followed by the start of an IHDR chunk. Never decoded.
pub const PNG_BYTES: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D',
    b'R',
];

pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub data_dir: TempDir,
    pub assets_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Names of all files currently in the assets root.
    pub fn asset_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.assets_dir.path())
            .expect("Failed to read assets dir")
            .map(|entry| {
                entry
                    .expect("Failed to read dir entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }

    pub fn data_path(&self, file: &str) -> std::path::PathBuf {
        self.data_dir.path().join(file)
    }
}

pub fn setup_test_app() -> TestApp {
    let data_dir = tempfile::tempdir().expect("Failed to create data dir");
    let assets_dir = tempfile::tempdir().expect("Failed to create assets dir");

    let config = Config {
        port: TEST_PORT,
        assets_root: assets_dir.path().to_path_buf(),
        data_dir: data_dir.path().to_path_buf(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_expiry_hours: 1,
        bcrypt_cost: 4,
    };

    let state = Arc::new(AppState::new(config).expect("Failed to create app state"));
    let server = TestServer::new(router(state.clone())).expect("Failed to start test server");

    TestApp {
        server,
        state,
        data_dir,
        assets_dir,
    }
}

pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// Signs up and logs in through the API.
pub async fn register_and_login(client: &TestServer, email: &str) -> TestUser {
    client
        .post("/api/users")
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = client
        .post("/api/login")
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    TestUser {
        id: body["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("Expected 'id' in login response"),
        email: email.to_string(),
        token: body["token"]
            .as_str()
            .expect("Expected 'token' in login response")
            .to_string(),
    }
}

pub async fn create_video(client: &TestServer, user: &TestUser, title: &str) -> Video {
    let response = client
        .post("/api/videos")
        .authorization_bearer(&user.token)
        .json(&json!({ "title": title, "description": "integration test video" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

pub fn image_part(bytes: &[u8], mime_type: &str) -> Part {
    Part::bytes(bytes.to_vec())
        .file_name("thumbnail.png")
        .mime_type(mime_type)
}

pub fn png_part() -> Part {
    image_part(PNG_BYTES, "image/png")
}

pub fn file_name_of(url: &str) -> &str {
    Path::new(url)
        .file_name()
        .and_then(|n| n.to_str())
        .expect("URL should end with a file name")
}
