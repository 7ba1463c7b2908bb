#![allow(async_fn_in_trait)]

use crate::domain::types::{ImportKey, ImportStage};
use crate::error::ContentStoreError;

/// Per-user import progress.
pub trait ImportStatusStore: Send + Sync {
    async fn set_stage(&self, key: &ImportKey, stage: ImportStage)
    -> Result<(), ContentStoreError>;

    /// `Idle` when nothing is recorded (or the record expired).
    async fn stage(&self, key: &ImportKey) -> Result<ImportStage, ContentStoreError>;
}
