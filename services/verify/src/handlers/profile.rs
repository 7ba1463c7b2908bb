use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use campus_core::identity::IdentityHeaders;

use crate::error::VerifyServiceError;
use crate::state::AppState;
use crate::usecase::profile::UpdateProfileNameUseCase;

// ── PATCH /users/@me/profile ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub name: String,
}

pub async fn update_profile(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, VerifyServiceError> {
    let usecase = UpdateProfileNameUseCase {
        profiles: state.profile_repo(),
    };
    let name = usecase.execute(identity.user_id, &body.name).await?;
    Ok(Json(ProfileResponse { name }))
}
