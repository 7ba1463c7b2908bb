use deadpool_redis::Pool;
use deadpool_redis::redis::AsyncCommands;

use crate::domain::repository::ImportStatusStore;
use crate::domain::types::{ImportKey, ImportStage};
use crate::error::ContentStoreError;

#[derive(Clone)]
pub struct RedisImportStatusStore {
    pub pool: Pool,
    pub ttl_secs: u64,
}

fn import_status_key(key: &ImportKey) -> String {
    format!("import_status:{key}")
}

impl ImportStatusStore for RedisImportStatusStore {
    async fn set_stage(
        &self,
        key: &ImportKey,
        stage: ImportStage,
    ) -> Result<(), ContentStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ContentStoreError::Internal(e.into()))?;
        let (): () = conn
            .set_ex(import_status_key(key), stage.code(), self.ttl_secs)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| ContentStoreError::Internal(e.into()))?;
        Ok(())
    }

    async fn stage(&self, key: &ImportKey) -> Result<ImportStage, ContentStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ContentStoreError::Internal(e.into()))?;
        let code: Option<i8> = conn
            .get(import_status_key(key))
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| ContentStoreError::Internal(e.into()))?;
        Ok(code.map(ImportStage::from_code).unwrap_or_default())
    }
}
