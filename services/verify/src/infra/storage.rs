use std::path::PathBuf;

use anyhow::Context as _;

use crate::domain::repository::ImageStore;
use crate::error::VerifyServiceError;

/// Writes encrypted images under a local directory that is served at `base_url`.
#[derive(Clone)]
pub struct FsImageStore {
    pub root: PathBuf,
    pub base_url: String,
}

impl ImageStore for FsImageStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String, VerifyServiceError> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create image directory {}", parent.display()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("write image {}", path.display()))?;
        Ok(format!("{}/{key}", self.base_url.trim_end_matches('/')))
    }
}
