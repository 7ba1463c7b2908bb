//! sea-orm entities owned by the bulk-email service.

pub mod course_emails;
pub mod course_members;
pub mod courses;
pub mod instructor_tasks;
