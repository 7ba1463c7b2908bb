//! Course identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CourseKeyError {
    #[error("course key must have the form org/course/run")]
    Malformed,
    #[error("course key segment {0:?} contains invalid characters")]
    InvalidSegment(String),
}

/// `org/course/run` triple identifying a course, e.g. `MITx/6.002x/2013_Spring`.
///
/// Segments are restricted to ASCII alphanumerics plus `.`, `-` and `_`, and may not be
/// `.` or `..`, so a key can be used as a relative filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseKey {
    org: String,
    course: String,
    run: String,
}

fn valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

impl CourseKey {
    pub fn new(org: &str, course: &str, run: &str) -> Result<Self, CourseKeyError> {
        for segment in [org, course, run] {
            if !valid_segment(segment) {
                return Err(CourseKeyError::InvalidSegment(segment.to_owned()));
            }
        }
        Ok(Self {
            org: org.to_owned(),
            course: course.to_owned(),
            run: run.to_owned(),
        })
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn run(&self) -> &str {
        &self.run
    }

    /// Path segments in order, for building storage locations.
    pub fn segments(&self) -> [&str; 3] {
        [&self.org, &self.course, &self.run]
    }
}

impl fmt::Display for CourseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.org, self.course, self.run)
    }
}

impl FromStr for CourseKey {
    type Err = CourseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(org), Some(course), Some(run), None) => Self::new(org, course, run),
            _ => Err(CourseKeyError::Malformed),
        }
    }
}

impl TryFrom<String> for CourseKey {
    type Error = CourseKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CourseKey> for String {
    fn from(key: CourseKey) -> Self {
        key.to_string()
    }
}
