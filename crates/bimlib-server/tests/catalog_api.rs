//! Integration tests for the catalog API.
//!
//! These drive the full router against the in-memory record store and a
//! temporary blob directory, covering the upload, listing, fetch and file
//! serving flows end to end.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use bimlib_server::blob::BlobStore;
use bimlib_server::store::MemoryModelStore;
use bimlib_server::{create_router, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "bimlib-test-boundary";
const MAX_UPLOAD: u64 = 1024 * 1024;

struct TestApp {
    app: Router,
    store: Arc<MemoryModelStore>,
    dir: TempDir,
}

impl TestApp {
    fn new(max_upload_bytes: u64) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = Arc::new(MemoryModelStore::new());
        let state = AppState::new(store.clone(), BlobStore::new(dir.path()), max_upload_bytes);
        Self {
            app: create_router(state),
            store,
            dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> axum::response::Response {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    async fn get(&self, uri: &str) -> axum::response::Response {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    fn stored_files(&self) -> usize {
        std::fs::read_dir(self.dir.path()).unwrap().count()
    }
}

/// One part of a multipart body.
struct Part<'a> {
    name: &'a str,
    filename: Option<&'a str>,
    data: &'a [u8],
}

fn text<'a>(name: &'a str, value: &'a str) -> Part<'a> {
    Part {
        name,
        filename: None,
        data: value.as_bytes(),
    }
}

fn file<'a>(name: &'a str, filename: &'a str, data: &'a [u8]) -> Part<'a> {
    Part {
        name,
        filename: Some(filename),
        data,
    }
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        part.name, filename
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                );
            }
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// Helper to parse JSON response body.
async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&body).expect("Failed to parse JSON response")
}

async fn upload(app: &TestApp, filename: &str, data: &[u8], fields: &[(&str, &str)]) -> Value {
    let mut parts = vec![file("model", filename, data)];
    parts.extend(fields.iter().map(|(name, value)| text(name, value)));

    let response = app.send(multipart_request("/api/upload", &parts)).await;
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await
}

#[tokio::test]
async fn test_upload_chair_creates_record_and_file() {
    let app = TestApp::new(MAX_UPLOAD);
    let data = vec![0x67u8; 1024 * 1024];

    let json = upload(
        &app,
        "chair.glb",
        &data,
        &[
            ("name", "Office Chair"),
            ("category", "Furniture"),
            ("description", ""),
            ("materials", ""),
            ("specifications", ""),
        ],
    )
    .await;

    assert_eq!(json["success"], true);
    let model = &json["model"];
    assert_eq!(model["name"], "Office Chair");
    assert_eq!(model["category"], "Furniture");
    assert_eq!(model["description"], "No description");
    assert_eq!(model["materials"], serde_json::json!([]));
    assert_eq!(model["specifications"], serde_json::json!([]));
    assert_eq!(model["fileSize"], 1024 * 1024);
    assert_eq!(model["originalName"], "chair.glb");
    assert!(model["uploadDate"].is_string());

    let file_path = model["filePath"].as_str().unwrap();
    assert!(file_path.starts_with("/uploads/"));
    assert!(file_path.ends_with("-chair.glb"));

    // The stored file can be served straight away.
    let response = app.get(file_path).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "model/gltf-binary"
    );
    let served = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(served.len(), data.len());
    assert_eq!(&served[..], &data[..]);
}

#[tokio::test]
async fn test_upload_defaults_and_list_parsing() {
    let app = TestApp::new(MAX_UPLOAD);

    let json = upload(
        &app,
        "desk.OBJ",
        b"v 0 0 0",
        &[
            ("materials", "oak, steel,, "),
            ("specifications", "default"),
        ],
    )
    .await;

    let model = &json["model"];
    assert_eq!(model["name"], "Unnamed Model");
    assert_eq!(model["category"], "Uncategorized");
    assert_eq!(model["materials"], serde_json::json!(["oak", "steel"]));
    assert_eq!(model["specifications"], serde_json::json!(["default"]));
}

#[tokio::test]
async fn test_text_fields_may_precede_file() {
    let app = TestApp::new(MAX_UPLOAD);

    let parts = [
        text("name", "Lamp"),
        text("category", "Lighting"),
        file("model", "lamp.fbx", b"Kaydara FBX Binary"),
    ];
    let response = app.send(multipart_request("/api/upload", &parts)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["model"]["name"], "Lamp");
    assert_eq!(json["model"]["category"], "Lighting");
}

#[tokio::test]
async fn test_list_is_newest_first_with_file_status() {
    let app = TestApp::new(MAX_UPLOAD);

    upload(&app, "first.glb", b"1", &[("name", "First")]).await;
    upload(&app, "second.obj", b"2", &[("name", "Second")]).await;
    upload(&app, "third.fbx", b"3", &[("name", "Third")]).await;

    let response = app.get("/api/models").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    let models = json.as_array().unwrap();
    let names: Vec<&str> = models.iter().map(|m| m["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Third", "Second", "First"]);

    for model in models {
        assert_eq!(model["fileExists"], true);
        assert_eq!(model["fileStatus"], "available");
    }
}

#[tokio::test]
async fn test_disallowed_extension_is_rejected() {
    let app = TestApp::new(MAX_UPLOAD);

    let parts = [file("model", "malware.exe", b"MZ"), text("name", "Totally a chair")];
    let response = app.send(multipart_request("/api/upload", &parts)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("GLB, OBJ, or FBX"));

    assert!(app.store.is_empty().await);
    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn test_missing_file_part_is_rejected() {
    let app = TestApp::new(MAX_UPLOAD);

    let parts = [text("name", "Ghost")];
    let response = app.send(multipart_request("/api/upload", &parts)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("No file uploaded"));
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_file_under_other_field_name_is_not_accepted() {
    let app = TestApp::new(MAX_UPLOAD);

    let parts = [file("file", "chair.glb", b"glTF")];
    let response = app.send(multipart_request("/api/upload", &parts)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected_while_streaming() {
    let app = TestApp::new(1024);
    let data = vec![0u8; 4096];

    let parts = [file("model", "huge.glb", &data)];
    let response = app.send(multipart_request("/api/upload", &parts)).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    assert!(app.store.is_empty().await);
    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn test_oversized_content_length_is_rejected_before_handler() {
    let app = TestApp::new(1024);
    let data = vec![0u8; 128 * 1024];

    let body = multipart_body(&[file("model", "huge.glb", &data)]);
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("maximum size"));
    assert!(app.store.is_empty().await);
    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn test_non_multipart_upload_is_json_bad_request() {
    let app = TestApp::new(MAX_UPLOAD);

    for uri in ["/api/upload", "/upload"] {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"Office Chair"}"#))
            .unwrap();

        let response = app.send(request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

        let json = json_body(response).await;
        assert!(json["error"].as_str().unwrap().starts_with("Invalid request"));
    }
    assert!(app.store.is_empty().await);
    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn test_get_model_is_stable_and_tracks_missing_file() {
    let app = TestApp::new(MAX_UPLOAD);

    let json = upload(&app, "chair.glb", b"glTF", &[("name", "Office Chair")]).await;
    let id = json["model"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/models/{}", id);

    let first = json_body(app.get(&uri).await).await;
    let second = json_body(app.get(&uri).await).await;
    assert_eq!(first, second);
    assert_eq!(first["id"], id.as_str());
    assert_eq!(first["fileExists"], true);

    // Remove the blob out of band; the record is still served.
    let stored = first["filePath"]
        .as_str()
        .unwrap()
        .trim_start_matches("/uploads/");
    std::fs::remove_file(app.dir.path().join(stored)).unwrap();

    let response = app.get(&uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    let after = json_body(response).await;
    assert_eq!(after["fileExists"], false);
    assert_eq!(after["fileStatus"], "missing");
    assert_eq!(after["name"], first["name"]);
    assert_eq!(after["uploadDate"], first["uploadDate"]);
}

#[tokio::test]
async fn test_malformed_id_is_bad_request_not_found() {
    let app = TestApp::new(MAX_UPLOAD);

    let response = app.get("/api/models/not-a-valid-id").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .get("/api/models/550e8400-e29b-41d4-a716-446655440000")
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_missing_file_asks_for_reupload() {
    let app = TestApp::new(MAX_UPLOAD);

    let response = app.get("/uploads/1700000000000-gone.glb").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = json_body(response).await;
    assert_eq!(json["error"], "File not found");
    assert!(json["message"].as_str().unwrap().contains("re-upload"));
}

#[tokio::test]
async fn test_traversal_file_name_is_rejected() {
    let app = TestApp::new(MAX_UPLOAD);

    let response = app.get("/uploads/..%2Fsecret.glb").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_overlong_file_name_is_bad_request() {
    let app = TestApp::new(MAX_UPLOAD);
    let name = format!("{}.glb", "a".repeat(300));

    let parts = [file("model", &name, b"glTF")];
    let response = app.send(multipart_request("/api/upload", &parts)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("Invalid file name"));
    assert!(app.store.is_empty().await);
    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn test_store_outage_fails_upload_without_orphan() {
    let app = TestApp::new(MAX_UPLOAD);
    app.store.set_available(false);

    let parts = [file("model", "chair.glb", b"glTF"), text("name", "Chair")];
    let response = app.send(multipart_request("/api/upload", &parts)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("Database not connected"));
    assert_eq!(app.stored_files(), 0);

    let response = app.get("/api/models").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    app.store.set_available(true);
    let json = json_body(app.get("/api/models").await).await;
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_basic_upload_stores_file_without_record() {
    let app = TestApp::new(MAX_UPLOAD);

    let parts = [file("file", "panel.obj", b"v 1 1 1")];
    let response = app.send(multipart_request("/upload", &parts)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["message"], "File uploaded successfully");
    let filename = json["filename"].as_str().unwrap();
    assert!(filename.ends_with("-panel.obj"));
    assert_eq!(json["path"], format!("/uploads/{}", filename));

    assert!(app.store.is_empty().await);
    let response = app.get(json["path"].as_str().unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "model/obj");
}

#[tokio::test]
async fn test_health_reports_store_and_directory() {
    let app = TestApp::new(MAX_UPLOAD);

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"]["connected"], true);
    assert_eq!(json["uploads"]["directory"], "exists");
    assert!(json["timestamp"].is_string());

    app.store.set_available(false);
    let json = json_body(app.get("/health").await).await;
    assert_eq!(json["database"]["connected"], false);
}
