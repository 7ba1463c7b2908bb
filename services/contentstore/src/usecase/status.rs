use uuid::Uuid;

use crate::domain::repository::ImportStatusStore;
use crate::domain::types::{ImportKey, ImportStatus};
use crate::error::ContentStoreError;

pub struct GetImportStatusUseCase<S: ImportStatusStore> {
    pub statuses: S,
}

impl<S: ImportStatusStore> GetImportStatusUseCase<S> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        org: &str,
        course: &str,
        file_name: &str,
    ) -> Result<ImportStatus, ContentStoreError> {
        let key = ImportKey::new(user_id, org, course, file_name);
        let stage = self.statuses.stage(&key).await?;
        Ok(stage.into())
    }
}
