use axum::{
    Json,
    extract::State,
    http::{
        HeaderMap,
        header::{AUTHORIZATION, CONTENT_TYPE, DATE},
    },
};
use bytes::Bytes;
use serde::Serialize;

use crate::error::VerifyServiceError;
use crate::state::AppState;
use crate::usecase::review::{HandleVendorResultUseCase, VendorCallback};

#[derive(Serialize)]
pub struct ResultAck {
    pub status: &'static str,
}

fn header<'a>(headers: &'a HeaderMap, name: &axum::http::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

// ── POST /verifications/results ──────────────────────────────────────────────

/// Vendor callback. Authenticated by the request signature, not by identity headers.
pub async fn receive_result(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ResultAck>, VerifyServiceError> {
    let usecase = HandleVendorResultUseCase {
        repo: state.verification_repo(),
        access_key: state.vendor.access_key.clone(),
        secret_key: state.vendor.secret_key.clone(),
        reviewing_service: state.vendor_name.clone(),
    };
    usecase
        .execute(VendorCallback {
            authorization: header(&headers, &AUTHORIZATION),
            content_type: header(&headers, &CONTENT_TYPE).unwrap_or_default(),
            date: header(&headers, &DATE).unwrap_or_default(),
            body: &body,
        })
        .await?;
    Ok(Json(ResultAck { status: "OK" }))
}
