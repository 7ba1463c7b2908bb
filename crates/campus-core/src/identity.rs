//! Gateway-injected identity headers extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-campus-user-id";
pub const USER_ROLE_HEADER: &str = "x-campus-user-role";

/// Role value for learners.
pub const ROLE_STUDENT: u8 = 0;
/// Role value for course staff allowed to run instructor tasks.
pub const ROLE_STAFF: u8 = 1;
/// Role value for platform administrators.
pub const ROLE_ADMIN: u8 = 2;

/// Caller identity injected by the gateway via `x-campus-user-id` and `x-campus-user-role`.
///
/// Rejects with 401 if either header is absent or malformed.
/// Role enforcement (403) is done by handlers after extraction.
#[derive(Debug, Clone)]
pub struct IdentityHeaders {
    pub user_id: Uuid,
    pub user_role: u8,
}

impl IdentityHeaders {
    pub fn require_role(&self, min_role: u8) -> Result<(), AppError> {
        if self.user_role < min_role {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = AppError;

    // Header values are read synchronously so the returned future owns no borrow of `parts`.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<Uuid>().ok());

        let user_role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u8>().ok());

        async move {
            let user_id = user_id.ok_or(AppError::Unauthorized)?;
            let user_role = user_role.ok_or(AppError::Unauthorized)?;
            Ok(Self { user_id, user_role })
        }
    }
}
