use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use campus_domain::course::CourseKey;

pub const TASK_TYPE_BULK_COURSE_EMAIL: &str = "bulk_course_email";
pub const ACTION_EMAILED: &str = "emailed";

// ── Courses ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub course_id: CourseKey,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseRole {
    Student,
    Staff,
    Instructor,
}

impl CourseRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Staff => "staff",
            Self::Instructor => "instructor",
        }
    }

    /// Staff and instructors may send course email.
    pub fn is_course_staff(self) -> bool {
        matches!(self, Self::Staff | Self::Instructor)
    }
}

impl FromStr for CourseRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "staff" => Ok(Self::Staff),
            "instructor" => Ok(Self::Instructor),
            other => Err(format!("unknown course role {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseMember {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: CourseRole,
    pub email_opt_out: bool,
}

// ── Course email ─────────────────────────────────────────────────────────────

/// Who a course email goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendTo {
    Myself,
    Staff,
    All,
}

impl SendTo {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Myself => "myself",
            Self::Staff => "staff",
            Self::All => "all",
        }
    }
}

impl FromStr for SendTo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "myself" => Ok(Self::Myself),
            "staff" => Ok(Self::Staff),
            "all" => Ok(Self::All),
            other => Err(format!("unknown recipient option {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseEmail {
    pub id: Uuid,
    pub course_id: CourseKey,
    pub sender_id: Uuid,
    pub to_option: SendTo,
    pub subject: String,
    pub html_message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub email: String,
    pub name: String,
}

/// Recipients an email will be sent to, plus how many were dropped for opting out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecipientSelection {
    pub recipients: Vec<Recipient>,
    pub skipped: u64,
}

/// Resolve `to_option` against the course roster.
///
/// Addresses are deduplicated case-insensitively, keeping roster order. Members who opted
/// out of course email are skipped, except the requester.
pub fn select_recipients(
    to_option: SendTo,
    requester_id: Uuid,
    members: &[CourseMember],
) -> RecipientSelection {
    let wanted = |member: &CourseMember| match to_option {
        SendTo::Myself => member.user_id == requester_id,
        SendTo::Staff => member.role.is_course_staff() || member.user_id == requester_id,
        SendTo::All => true,
    };

    let mut seen = HashSet::new();
    let mut selection = RecipientSelection::default();
    for member in members.iter().filter(|m| wanted(m)) {
        if !seen.insert(member.email.to_lowercase()) {
            continue;
        }
        if member.email_opt_out && member.user_id != requester_id {
            selection.skipped += 1;
            continue;
        }
        selection.recipients.push(Recipient {
            email: member.email.clone(),
            name: member.name.clone(),
        });
    }
    selection
}

// ── Rendering ────────────────────────────────────────────────────────────────

pub const DEFAULT_TEMPLATE: &str = "<html><body>\
<p>Dear {{name}},</p>\
{{message_body}}\
<hr/>\
<p>You are receiving this message as a member of {{course_title}}. \
This email was sent to {{email}}.</p>\
</body></html>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub html_body: String,
}

/// Fill `{{name}}`, `{{email}}`, `{{course_title}}` and `{{message_body}}` in `template`.
pub fn render_email(
    template: &str,
    course_title: &str,
    email: &CourseEmail,
    recipient: &Recipient,
) -> EmailMessage {
    let html_body = template
        .replace("{{name}}", &recipient.name)
        .replace("{{email}}", &recipient.email)
        .replace("{{course_title}}", course_title)
        .replace("{{message_body}}", &email.html_message);
    EmailMessage {
        to_email: recipient.email.clone(),
        to_name: recipient.name.clone(),
        subject: format!("[{course_title}] {}", email.subject),
        html_body,
    }
}

// ── Sending ──────────────────────────────────────────────────────────────────

/// Why a single message could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// Worth retrying later (disconnect, throttling, server error).
    #[error("transient send failure: {0}")]
    Transient(String),
    /// Retrying will not help (rejected address, malformed message).
    #[error("permanent send failure: {0}")]
    Permanent(String),
}

/// Delay before retry number `retries + 1`: `base * 2^retries * jitter`.
pub fn retry_delay(base: Duration, retries: u32, jitter: f64) -> Duration {
    base.mul_f64(2f64.powi(retries.min(16) as i32) * jitter)
}

// ── Instructor task ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskState {
    Queued,
    Progress,
    Success,
    Failure,
}

impl TaskState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::Progress => "PROGRESS",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }
}

impl FromStr for TaskState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QUEUED" => Ok(Self::Queued),
            "PROGRESS" => Ok(Self::Progress),
            "SUCCESS" => Ok(Self::Success),
            "FAILURE" => Ok(Self::Failure),
            other => Err(format!("unknown task state {other:?}")),
        }
    }
}

/// Aggregate counts stored as the task output.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskProgress {
    pub action_name: String,
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub skipped: u64,
    pub total: u64,
    pub duration_ms: u64,
}

impl TaskProgress {
    pub fn new(selection: &RecipientSelection) -> Self {
        Self {
            action_name: ACTION_EMAILED.to_owned(),
            skipped: selection.skipped,
            total: selection.recipients.len() as u64 + selection.skipped,
            ..Default::default()
        }
    }

    pub fn add(&mut self, batch: &BatchResult) {
        self.succeeded += batch.succeeded;
        self.failed += batch.failed;
        self.attempted += batch.succeeded + batch.failed;
    }
}

/// Outcome of one batch (subtask) of recipients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchResult {
    pub succeeded: u64,
    pub failed: u64,
    pub retries: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInput {
    pub email_id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstructorTask {
    pub id: Uuid,
    pub task_type: String,
    pub course_id: CourseKey,
    pub task_key: String,
    pub task_id: String,
    pub task_input: serde_json::Value,
    pub task_state: TaskState,
    pub task_output: Option<serde_json::Value>,
    pub requester_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InstructorTask {
    /// New QUEUED bulk email task for `email`.
    pub fn for_email(email: &CourseEmail, now: DateTime<Utc>) -> Self {
        let input = TaskInput { email_id: email.id };
        Self {
            id: Uuid::now_v7(),
            task_type: TASK_TYPE_BULK_COURSE_EMAIL.to_owned(),
            course_id: email.course_id.clone(),
            task_key: email.id.to_string(),
            task_id: Uuid::new_v4().to_string(),
            task_input: serde_json::json!(input),
            task_state: TaskState::Queued,
            task_output: None,
            requester_id: email.sender_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn input(&self) -> Option<TaskInput> {
        serde_json::from_value(self.task_input.clone()).ok()
    }
}
