use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Serialize;

use campus_core::identity::{IdentityHeaders, ROLE_STAFF};
use campus_domain::course::CourseKey;

use crate::domain::types::ImportStatus;
use crate::error::ContentStoreError;
use crate::state::AppState;
use crate::usecase::import::{CourseUpload, ImportCourseUseCase};
use crate::usecase::status::GetImportStatusUseCase;

const NAME_FIELD: &str = "name";
const DATA_FIELD: &str = "course-data";

#[derive(Serialize)]
pub struct ImportResponse {
    #[serde(rename = "Status")]
    pub status: &'static str,
}

/// Read the `name` and `course-data` fields. The `name` field wins over the part's filename.
async fn read_upload(mut multipart: Multipart) -> Result<CourseUpload, ContentStoreError> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        ContentStoreError::InvalidUpload(e.body_text())
    };

    let mut name = None;
    let mut part_file_name = None;
    let mut data = None;
    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some(NAME_FIELD) => name = Some(field.text().await.map_err(invalid)?),
            Some(DATA_FIELD) => {
                part_file_name = field.file_name().map(str::to_owned);
                data = Some(field.bytes().await.map_err(invalid)?.to_vec());
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| {
        ContentStoreError::InvalidUpload(format!("missing {DATA_FIELD} field"))
    })?;
    let file_name = name
        .or(part_file_name)
        .ok_or_else(|| ContentStoreError::InvalidUpload(format!("missing {NAME_FIELD} field")))?;
    Ok(CourseUpload { file_name, data })
}

// ── POST /import/{org}/{course}/{name} ───────────────────────────────────────

pub async fn import_course(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path((org, course, name)): Path<(String, String, String)>,
    multipart: Multipart,
) -> Result<Json<ImportResponse>, ContentStoreError> {
    identity.require_role(ROLE_STAFF)?;
    let course_id = CourseKey::new(&org, &course, &name)?;
    let upload = read_upload(multipart).await?;

    let usecase = ImportCourseUseCase {
        statuses: state.status_store(),
        data_dir: state.data_dir.clone(),
    };
    usecase.execute(identity.user_id, &course_id, upload).await?;
    Ok(Json(ImportResponse { status: "OK" }))
}

// ── GET /import_status/{org}/{course}/{filename} ─────────────────────────────

pub async fn import_status(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path((org, course, file_name)): Path<(String, String, String)>,
) -> Result<Json<ImportStatus>, ContentStoreError> {
    let usecase = GetImportStatusUseCase {
        statuses: state.status_store(),
    };
    let status = usecase
        .execute(identity.user_id, &org, &course, &file_name)
        .await?;
    Ok(Json(status))
}
