use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
};

use campus_core::health::{healthz, readiness};
use campus_core::middleware::with_observability;

use crate::handlers::{
    export::export_course,
    import::{import_course, import_status},
};
use crate::state::AppState;

async fn readyz(State(state): State<AppState>) -> StatusCode {
    readiness(state.redis.get().await.map(|_| ()), "redis")
}

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    let router = Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Course archives
        .route("/import/{org}/{course}/{name}", post(import_course))
        .route("/import_status/{org}/{course}/{filename}", get(import_status))
        .route("/export/{org}/{course}/{name}", get(export_course))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state);
    with_observability(router)
}
