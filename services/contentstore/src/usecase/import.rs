use std::path::PathBuf;

use anyhow::Context as _;
use tracing::{info, warn};
use uuid::Uuid;

use campus_domain::course::CourseKey;

use crate::domain::repository::ImportStatusStore;
use crate::domain::types::{ImportKey, ImportStage, is_supported_archive};
use crate::error::ContentStoreError;
use crate::infra::archive::{find_course_root, install_course, install_path, unpack_archive};

pub struct CourseUpload {
    /// Client-supplied file name; may carry a client path.
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Unpack an uploaded course archive and install it, recording each stage.
pub struct ImportCourseUseCase<S: ImportStatusStore> {
    pub statuses: S,
    pub data_dir: PathBuf,
}

impl<S: ImportStatusStore> ImportCourseUseCase<S> {
    /// Returns the installed course directory.
    pub async fn execute(
        &self,
        user_id: Uuid,
        course_id: &CourseKey,
        upload: CourseUpload,
    ) -> Result<PathBuf, ContentStoreError> {
        let key = ImportKey::for_course(user_id, course_id, &upload.file_name);
        if !is_supported_archive(&key.file_name) {
            return Err(ContentStoreError::UnsupportedArchive(key.file_name));
        }

        // Staging lives under data_dir so the final install is a rename.
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .context("create data dir")?;
        let staging = tempfile::Builder::new()
            .prefix(".import-")
            .tempdir_in(&self.data_dir)
            .context("create staging dir")?;

        // ── 1. Unpack ────────────────────────────────────────────────────────
        self.statuses.set_stage(&key, ImportStage::Unpacking).await?;
        let extract_dir = staging.path().to_path_buf();
        let data = upload.data;
        tokio::task::spawn_blocking(move || unpack_archive(&data, &extract_dir))
            .await
            .context("join unpack task")?
            .map_err(|e| {
                warn!(
                    course_id = %course_id,
                    file_name = %key.file_name,
                    error = %e,
                    "archive rejected"
                );
                ContentStoreError::InvalidArchive(e.to_string())
            })?;

        // ── 2. Verify ────────────────────────────────────────────────────────
        self.statuses.set_stage(&key, ImportStage::Verifying).await?;
        let search_dir = staging.path().to_path_buf();
        let course_root = tokio::task::spawn_blocking(move || find_course_root(&search_dir))
            .await
            .context("join descriptor search")?
            .context("search for course descriptor")?
            .ok_or(ContentStoreError::MissingCourseXml)?;

        // ── 3. Install ───────────────────────────────────────────────────────
        self.statuses.set_stage(&key, ImportStage::Updating).await?;
        let dest = install_path(&self.data_dir, course_id);
        let install_dest = dest.clone();
        let installed =
            tokio::task::spawn_blocking(move || install_course(&course_root, &install_dest))
                .await
                .context("join install task")?
                .context("install course");
        if let Err(e) = installed {
            self.statuses.set_stage(&key, ImportStage::InstallFailed).await?;
            return Err(e.into());
        }

        info!(
            course_id = %course_id,
            file_name = %key.file_name,
            dest = %dest.display(),
            "course imported"
        );
        Ok(dest)
    }
}
