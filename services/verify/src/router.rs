use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, patch, post, put},
};
use tower_http::services::ServeDir;

use campus_core::health::{healthz, readiness};
use campus_core::middleware::with_observability;

use crate::handlers::{
    profile::update_profile,
    results::receive_result,
    verification::{
        create_attempt, get_attempt, get_my_status, mark_ready, submit_attempt,
        upload_face_image, upload_photo_id_image,
    },
};
use crate::state::AppState;

async fn readyz(State(state): State<AppState>) -> StatusCode {
    readiness(state.db.ping().await, "postgres")
}

pub fn build_router(state: AppState, max_image_bytes: usize) -> Router {
    let images = ServeDir::new(state.images.root.clone());
    let router = Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Profile
        .route("/users/@me/profile", patch(update_profile))
        // Attempts
        .route("/verifications", post(create_attempt))
        .route("/verifications/@me", get(get_my_status))
        .route("/verifications/{id}", get(get_attempt))
        .route("/verifications/{id}/face-image", put(upload_face_image))
        .route("/verifications/{id}/photo-id-image", put(upload_photo_id_image))
        .route("/verifications/{id}/ready", post(mark_ready))
        .route("/verifications/{id}/submit", post(submit_attempt))
        // Vendor callback
        .route("/verifications/results", post(receive_result))
        // Encrypted images, fetched by the vendor
        .nest_service("/images", images)
        .layer(DefaultBodyLimit::max(max_image_bytes))
        .with_state(state);
    with_observability(router)
}
