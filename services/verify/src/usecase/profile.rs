use uuid::Uuid;

use crate::domain::repository::ProfileRepository;
use crate::domain::types::MAX_NAME_LEN;
use crate::error::VerifyServiceError;

pub struct UpdateProfileNameUseCase<P: ProfileRepository> {
    pub profiles: P,
}

impl<P: ProfileRepository> UpdateProfileNameUseCase<P> {
    /// Store the trimmed name. Attempts already marked ready keep the name they froze.
    pub async fn execute(&self, user_id: Uuid, name: &str) -> Result<String, VerifyServiceError> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(VerifyServiceError::InvalidName);
        }
        self.profiles.upsert_name(user_id, name).await?;
        Ok(name.to_owned())
    }
}
