use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use campus_domain::course::CourseKey;

/// Archive suffix accepted for course imports.
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";
/// Descriptor that marks the root of a course export.
pub const COURSE_DESCRIPTOR: &str = "course.xml";

/// Progress of a course import, as reported by the status endpoint.
///
/// An import that fails stays at the stage where it stopped, so a client polling the status
/// can tell which step went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportStage {
    /// No import known for this file.
    #[default]
    Idle,
    Unpacking,
    /// Looking for the course descriptor.
    Verifying,
    /// Installing the course. Remains set once the import completes.
    Updating,
    /// The course could not be installed. Negative so it never reads as completed.
    InstallFailed,
}

impl ImportStage {
    pub fn code(self) -> i8 {
        match self {
            Self::Idle => 0,
            Self::Unpacking => 1,
            Self::Verifying => 2,
            Self::Updating => 3,
            Self::InstallFailed => -3,
        }
    }

    /// Unknown codes read as `Idle`.
    pub fn from_code(code: i8) -> Self {
        match code {
            1 => Self::Unpacking,
            2 => Self::Verifying,
            3 => Self::Updating,
            -3 => Self::InstallFailed,
            _ => Self::Idle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportStatus {
    #[serde(rename = "ImportStatus")]
    pub code: i8,
}

impl From<ImportStage> for ImportStatus {
    fn from(stage: ImportStage) -> Self {
        Self { code: stage.code() }
    }
}

/// Identifies one upload for status tracking. Imports of the same file into any run of a
/// course share a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportKey {
    pub user_id: Uuid,
    pub org: String,
    pub course: String,
    pub file_name: String,
}

impl ImportKey {
    pub fn new(user_id: Uuid, org: &str, course: &str, file_name: &str) -> Self {
        Self {
            user_id,
            org: org.to_owned(),
            course: course.to_owned(),
            file_name: upload_file_name(file_name).to_owned(),
        }
    }

    pub fn for_course(user_id: Uuid, course_id: &CourseKey, file_name: &str) -> Self {
        Self::new(user_id, course_id.org(), course_id.course(), file_name)
    }
}

impl fmt::Display for ImportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}/{}:{}",
            self.user_id, self.org, self.course, self.file_name
        )
    }
}

/// Last path segment of an uploaded file name. Browsers may send a full client path.
pub fn upload_file_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

pub fn is_supported_archive(file_name: &str) -> bool {
    file_name.len() > ARCHIVE_SUFFIX.len() && file_name.ends_with(ARCHIVE_SUFFIX)
}
