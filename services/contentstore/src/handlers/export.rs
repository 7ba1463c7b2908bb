use axum::{
    extract::{Path, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
};

use campus_core::identity::{IdentityHeaders, ROLE_STAFF};
use campus_domain::course::CourseKey;

use crate::error::ContentStoreError;
use crate::state::AppState;
use crate::usecase::export::ExportCourseUseCase;

// ── GET /export/{org}/{course}/{name} ────────────────────────────────────────

pub async fn export_course(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path((org, course, name)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ContentStoreError> {
    identity.require_role(ROLE_STAFF)?;
    let course_id = CourseKey::new(&org, &course, &name)?;

    let usecase = ExportCourseUseCase {
        data_dir: state.data_dir.clone(),
    };
    let archive = usecase.execute(&course_id).await?;

    let disposition = format!("attachment; filename=\"{}.tar.gz\"", course_id.run());
    Ok((
        [
            (CONTENT_TYPE, "application/x-tgz".to_owned()),
            (CONTENT_DISPOSITION, disposition),
        ],
        archive,
    ))
}
