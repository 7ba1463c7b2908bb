use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use campus_bulk_email::infra::mail::HttpMailTransport;
use campus_bulk_email::router::build_router;
use campus_bulk_email::state::AppState;
use campus_bulk_email::usecase::send::SendSettings;
use campus_core::identity::{USER_ID_HEADER, USER_ROLE_HEADER};

/// Router over a disconnected database; only paths that fail before touching it are usable.
fn test_app() -> Router {
    let state = AppState {
        db: DatabaseConnection::Disconnected,
        transport: HttpMailTransport {
            client: reqwest::Client::new(),
            api_url: "http://127.0.0.1:9/send".into(),
            api_key: "key".into(),
            sender_email: "course-updates@campus.test".into(),
            sender_name: "Campus".into(),
        },
        send_settings: SendSettings::default(),
    };
    build_router(state)
}

async fn body_json(body: Body) -> serde_json::Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn create_request(role: &str, course_path: &str) -> Request<Body> {
    let body = json!({ "to": "all", "subject": "Hello", "message": "<p>hi</p>" });
    Request::builder()
        .method("POST")
        .uri(format!("/courses/{course_path}/emails"))
        .header(USER_ID_HEADER, Uuid::new_v4().to_string())
        .header(USER_ROLE_HEADER, role)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn should_answer_healthz() {
    let request = Request::builder()
        .uri("/healthz")
        .body(Body::empty())
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_report_unready_without_database() {
    let request = Request::builder()
        .uri("/readyz")
        .body(Body::empty())
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn should_require_identity_headers() {
    let request = Request::builder()
        .uri("/courses/edX/1.23x/test_course/email-tasks/abc")
        .body(Body::empty())
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_forbid_students_from_sending() {
    let response = test_app()
        .oneshot(create_request("0", "edX/1.23x/test_course"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["kind"], "FORBIDDEN");
}

#[tokio::test]
async fn should_reject_invalid_course_key() {
    let response = test_app()
        .oneshot(create_request("1", "edX/1.23x/bad~run"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["kind"], "INVALID_COURSE_KEY");
}
