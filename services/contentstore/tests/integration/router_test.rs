use std::fs;
use std::path::Path;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use tower::ServiceExt;
use uuid::Uuid;

use campus_contentstore::router::build_router;
use campus_contentstore::state::AppState;
use campus_core::identity::{USER_ID_HEADER, USER_ROLE_HEADER};

const BOUNDARY: &str = "campus-test-boundary";

/// Router whose Redis pool points at a closed port; only paths that skip Redis are usable.
fn test_app(data_dir: &Path) -> Router {
    let redis = deadpool_redis::Config::from_url("redis://127.0.0.1:9")
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .unwrap();
    let state = AppState {
        redis,
        data_dir: data_dir.to_path_buf(),
        import_status_ttl_secs: 60,
    };
    build_router(state, 1024 * 1024)
}

fn multipart_body(name: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n{name}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"course-data\"; \
             filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn staff_request(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_ID_HEADER, Uuid::new_v4().to_string())
        .header(USER_ROLE_HEADER, "1")
}

async fn body_json(body: Body) -> serde_json::Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn should_answer_healthz() {
    let dir = tempfile::tempdir().unwrap();
    let request = Request::builder()
        .uri("/healthz")
        .body(Body::empty())
        .unwrap();

    let response = test_app(dir.path()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_reject_non_tar_gz_upload_with_415() {
    let dir = tempfile::tempdir().unwrap();
    let request = staff_request("POST", "/import/EDx/0.00x/2013_Spring")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body("course.zip", b"PK\x03\x04")))
        .unwrap();

    let response = test_app(dir.path()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["kind"], "UNSUPPORTED_ARCHIVE");
}

#[tokio::test]
async fn should_forbid_students_from_importing() {
    let dir = tempfile::tempdir().unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/import/EDx/0.00x/2013_Spring")
        .header(USER_ID_HEADER, Uuid::new_v4().to_string())
        .header(USER_ROLE_HEADER, "0")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body("good.tar.gz", b"")))
        .unwrap();

    let response = test_app(dir.path()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn should_require_identity_for_import_status() {
    let dir = tempfile::tempdir().unwrap();
    let request = Request::builder()
        .uri("/import_status/EDx/0.00x/good.tar.gz")
        .body(Body::empty())
        .unwrap();

    let response = test_app(dir.path()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_export_installed_course_as_tgz() {
    let dir = tempfile::tempdir().unwrap();
    let course = dir.path().join("EDx/0.00x/2013_Spring");
    fs::create_dir_all(&course).unwrap();
    fs::write(course.join("course.xml"), "<course/>").unwrap();
    let request = staff_request("GET", "/export/EDx/0.00x/2013_Spring")
        .body(Body::empty())
        .unwrap();

    let response = test_app(dir.path()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/x-tgz"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"2013_Spring.tar.gz\""
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..2], [0x1f, 0x8b]);
}

#[tokio::test]
async fn should_return_404_for_unknown_export() {
    let dir = tempfile::tempdir().unwrap();
    let request = staff_request("GET", "/export/EDx/0.00x/2013_Spring")
        .body(Body::empty())
        .unwrap();

    let response = test_app(dir.path()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["kind"], "COURSE_NOT_FOUND");
}
