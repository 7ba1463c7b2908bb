use std::fs;

use flate2::read::GzDecoder;
use tar::Archive;
use uuid::Uuid;

use campus_contentstore::error::ContentStoreError;
use campus_contentstore::usecase::export::ExportCourseUseCase;
use campus_contentstore::usecase::import::{CourseUpload, ImportCourseUseCase};

use crate::helpers::{MockStatusStore, course_key, good_course_archive};

fn entry_paths(archive: &[u8]) -> Vec<String> {
    let mut archive = Archive::new(GzDecoder::new(archive));
    archive
        .entries()
        .unwrap()
        .map(|entry| entry.unwrap().path().unwrap().display().to_string())
        .collect()
}

#[tokio::test]
async fn should_export_imported_course() {
    let data_dir = tempfile::tempdir().unwrap();
    let import = ImportCourseUseCase {
        statuses: MockStatusStore::default(),
        data_dir: data_dir.path().to_path_buf(),
    };
    import
        .execute(
            Uuid::new_v4(),
            &course_key(),
            CourseUpload {
                file_name: "good.tar.gz".into(),
                data: good_course_archive(),
            },
        )
        .await
        .unwrap();

    let export = ExportCourseUseCase {
        data_dir: data_dir.path().to_path_buf(),
    };
    let archive = export.execute(&course_key()).await.unwrap();

    let paths = entry_paths(&archive);
    assert!(paths.iter().any(|p| p == "2013_Spring/course.xml"));
    assert!(paths.iter().any(|p| p == "2013_Spring/course/2013_Spring.xml"));
}

#[tokio::test]
async fn should_return_not_found_for_missing_course() {
    let data_dir = tempfile::tempdir().unwrap();
    let export = ExportCourseUseCase {
        data_dir: data_dir.path().to_path_buf(),
    };

    let result = export.execute(&course_key()).await;

    assert!(matches!(result, Err(ContentStoreError::CourseNotFound)));
}

#[tokio::test]
async fn should_not_export_a_plain_file() {
    let data_dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(data_dir.path().join("EDx/0.00x")).unwrap();
    fs::write(data_dir.path().join("EDx/0.00x/2013_Spring"), b"file").unwrap();
    let export = ExportCourseUseCase {
        data_dir: data_dir.path().to_path_buf(),
    };

    let result = export.execute(&course_key()).await;

    assert!(matches!(result, Err(ContentStoreError::CourseNotFound)));
}
