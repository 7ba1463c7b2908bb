use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::infra::crypto::ImageCipher;
use crate::infra::db::{DbProfileRepository, DbVerificationRepository};
use crate::infra::storage::FsImageStore;
use crate::infra::vendor::HttpVerificationVendor;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub cipher: Arc<ImageCipher>,
    pub vendor: HttpVerificationVendor,
    pub images: FsImageStore,
    pub callback_url: String,
    pub vendor_name: String,
    pub days_good_for: i64,
}

impl AppState {
    pub fn profile_repo(&self) -> DbProfileRepository {
        DbProfileRepository {
            db: self.db.clone(),
        }
    }

    pub fn verification_repo(&self) -> DbVerificationRepository {
        DbVerificationRepository {
            db: self.db.clone(),
        }
    }
}
