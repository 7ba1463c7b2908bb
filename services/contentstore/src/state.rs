use std::path::PathBuf;

use deadpool_redis::Pool;

use crate::infra::status::RedisImportStatusStore;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub redis: Pool,
    pub data_dir: PathBuf,
    pub import_status_ttl_secs: u64,
}

impl AppState {
    pub fn status_store(&self) -> RedisImportStatusStore {
        RedisImportStatusStore {
            pool: self.redis.clone(),
            ttl_secs: self.import_status_ttl_secs,
        }
    }
}
