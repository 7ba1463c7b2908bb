use std::fs;

use uuid::Uuid;

use campus_contentstore::domain::types::ImportStage;
use campus_contentstore::error::ContentStoreError;
use campus_contentstore::usecase::import::{CourseUpload, ImportCourseUseCase};
use campus_contentstore::usecase::status::GetImportStatusUseCase;

use crate::helpers::{MockStatusStore, bad_course_archive, course_key, good_course_archive, tar_gz};

fn upload(file_name: &str, data: Vec<u8>) -> CourseUpload {
    CourseUpload {
        file_name: file_name.into(),
        data,
    }
}

async fn status_code(statuses: &MockStatusStore, user_id: Uuid, file_name: &str) -> i8 {
    let usecase = GetImportStatusUseCase {
        statuses: statuses.clone(),
    };
    usecase
        .execute(user_id, "EDx", "0.00x", file_name)
        .await
        .unwrap()
        .code
}

#[tokio::test]
async fn should_install_course_with_descriptor() {
    let data_dir = tempfile::tempdir().unwrap();
    let statuses = MockStatusStore::default();
    let usecase = ImportCourseUseCase {
        statuses: statuses.clone(),
        data_dir: data_dir.path().to_path_buf(),
    };
    let user_id = Uuid::new_v4();

    let installed = usecase
        .execute(
            user_id,
            &course_key(),
            upload("/home/staff/good.tar.gz", good_course_archive()),
        )
        .await
        .unwrap();

    assert_eq!(installed, data_dir.path().join("EDx/0.00x/2013_Spring"));
    assert!(installed.join("course.xml").is_file());
    assert_eq!(
        fs::read_to_string(installed.join("course/2013_Spring.xml")).unwrap(),
        "<course></course>"
    );
    assert!(matches!(
        status_code(&statuses, user_id, "good.tar.gz").await,
        0 | 3
    ));
    assert_eq!(
        *statuses.history.lock().unwrap(),
        [
            ImportStage::Unpacking,
            ImportStage::Verifying,
            ImportStage::Updating
        ]
    );
}

#[tokio::test]
async fn should_stop_at_verifying_without_descriptor() {
    let data_dir = tempfile::tempdir().unwrap();
    let statuses = MockStatusStore::default();
    let usecase = ImportCourseUseCase {
        statuses: statuses.clone(),
        data_dir: data_dir.path().to_path_buf(),
    };
    let user_id = Uuid::new_v4();

    let result = usecase
        .execute(user_id, &course_key(), upload("bad.tar.gz", bad_course_archive()))
        .await;

    assert!(matches!(result, Err(ContentStoreError::MissingCourseXml)));
    assert_eq!(status_code(&statuses, user_id, "bad.tar.gz").await, 2);
    assert!(!data_dir.path().join("EDx").exists());
}

#[tokio::test]
async fn should_reject_non_tar_gz_before_unpacking() {
    let data_dir = tempfile::tempdir().unwrap();
    let statuses = MockStatusStore::default();
    let usecase = ImportCourseUseCase {
        statuses: statuses.clone(),
        data_dir: data_dir.path().to_path_buf(),
    };
    let user_id = Uuid::new_v4();

    let result = usecase
        .execute(user_id, &course_key(), upload("course.zip", good_course_archive()))
        .await;

    assert!(matches!(
        result,
        Err(ContentStoreError::UnsupportedArchive(name)) if name == "course.zip"
    ));
    assert!(statuses.history.lock().unwrap().is_empty());
    assert_eq!(status_code(&statuses, user_id, "course.zip").await, 0);
}

#[tokio::test]
async fn should_reject_corrupt_archive_while_unpacking() {
    let data_dir = tempfile::tempdir().unwrap();
    let statuses = MockStatusStore::default();
    let usecase = ImportCourseUseCase {
        statuses: statuses.clone(),
        data_dir: data_dir.path().to_path_buf(),
    };
    let user_id = Uuid::new_v4();

    let result = usecase
        .execute(user_id, &course_key(), upload("good.tar.gz", b"not gzip".to_vec()))
        .await;

    assert!(matches!(result, Err(ContentStoreError::InvalidArchive(_))));
    assert_eq!(status_code(&statuses, user_id, "good.tar.gz").await, 1);
}

#[tokio::test]
async fn should_replace_previous_import() {
    let data_dir = tempfile::tempdir().unwrap();
    let usecase = ImportCourseUseCase {
        statuses: MockStatusStore::default(),
        data_dir: data_dir.path().to_path_buf(),
    };
    let user_id = Uuid::new_v4();
    usecase
        .execute(
            user_id,
            &course_key(),
            upload(
                "v1.tar.gz",
                tar_gz(&[("v1/course.xml", "<course/>"), ("v1/old.xml", "old")]),
            ),
        )
        .await
        .unwrap();

    let installed = usecase
        .execute(
            user_id,
            &course_key(),
            upload("v2.tar.gz", tar_gz(&[("v2/course.xml", "<course/>")])),
        )
        .await
        .unwrap();

    assert!(installed.join("course.xml").is_file());
    assert!(!installed.join("old.xml").exists());
}

#[tokio::test]
async fn should_clean_up_staging_directories() {
    let data_dir = tempfile::tempdir().unwrap();
    let usecase = ImportCourseUseCase {
        statuses: MockStatusStore::default(),
        data_dir: data_dir.path().to_path_buf(),
    };
    let user_id = Uuid::new_v4();
    let _ = usecase
        .execute(user_id, &course_key(), upload("bad.tar.gz", bad_course_archive()))
        .await;
    usecase
        .execute(user_id, &course_key(), upload("good.tar.gz", good_course_archive()))
        .await
        .unwrap();

    let leftovers: Vec<_> = fs::read_dir(data_dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with(".import-"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn should_keep_status_per_user() {
    let data_dir = tempfile::tempdir().unwrap();
    let statuses = MockStatusStore::default();
    let usecase = ImportCourseUseCase {
        statuses: statuses.clone(),
        data_dir: data_dir.path().to_path_buf(),
    };
    let _ = usecase
        .execute(
            Uuid::new_v4(),
            &course_key(),
            upload("bad.tar.gz", bad_course_archive()),
        )
        .await;

    assert_eq!(status_code(&statuses, Uuid::new_v4(), "bad.tar.gz").await, 0);
}

#[tokio::test]
async fn should_record_failed_install() {
    let data_dir = tempfile::tempdir().unwrap();
    // A file where the org directory belongs makes the install step fail.
    fs::write(data_dir.path().join("EDx"), b"not a directory").unwrap();
    let statuses = MockStatusStore::default();
    let usecase = ImportCourseUseCase {
        statuses: statuses.clone(),
        data_dir: data_dir.path().to_path_buf(),
    };
    let user_id = Uuid::new_v4();

    let result = usecase
        .execute(user_id, &course_key(), upload("good.tar.gz", good_course_archive()))
        .await;

    assert!(matches!(result, Err(ContentStoreError::Internal(_))));
    assert_eq!(status_code(&statuses, user_id, "good.tar.gz").await, -3);
    assert_eq!(
        *statuses.history.lock().unwrap(),
        [
            ImportStage::Unpacking,
            ImportStage::Verifying,
            ImportStage::Updating,
            ImportStage::InstallFailed
        ]
    );
}
