use std::path::PathBuf;

use anyhow::Context as _;

use campus_domain::course::CourseKey;

use crate::error::ContentStoreError;
use crate::infra::archive::{install_path, pack_course};

/// Pack an installed course as a gzipped tarball.
pub struct ExportCourseUseCase {
    pub data_dir: PathBuf,
}

impl ExportCourseUseCase {
    pub async fn execute(&self, course_id: &CourseKey) -> Result<Vec<u8>, ContentStoreError> {
        let dir = install_path(&self.data_dir, course_id);
        let is_installed = tokio::fs::metadata(&dir)
            .await
            .is_ok_and(|meta| meta.is_dir());
        if !is_installed {
            return Err(ContentStoreError::CourseNotFound);
        }

        let name = course_id.run().to_owned();
        let archive = tokio::task::spawn_blocking(move || pack_course(&dir, &name))
            .await
            .context("join export task")?
            .context("pack course")?;
        Ok(archive)
    }
}
