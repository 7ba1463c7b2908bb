use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use campus_core::health::{healthz, readiness};
use campus_core::middleware::with_observability;

use crate::handlers::email::{create_email, get_email_task};
use crate::state::AppState;

async fn readyz(State(state): State<AppState>) -> StatusCode {
    readiness(state.db.ping().await, "postgres")
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Course email
        .route("/courses/{org}/{course}/{run}/emails", post(create_email))
        .route(
            "/courses/{org}/{course}/{run}/email-tasks/{task_id}",
            get(get_email_task),
        )
        .with_state(state);
    with_observability(router)
}
