use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Lifecycle of a photo verification attempt.
///
/// ```text
///                 → → → must_retry
///                 ↑        ↑ ↓
///  created → ready → submitted → approved
///                         ↓
///                         → → → denied
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Created,
    Ready,
    Submitted,
    MustRetry,
    Approved,
    Denied,
}

impl VerificationStatus {
    pub const ALL: [Self; 6] = [
        Self::Created,
        Self::Ready,
        Self::Submitted,
        Self::MustRetry,
        Self::Approved,
        Self::Denied,
    ];

    /// Statuses that mean the user does not need to be prompted to verify again.
    pub const VALID_OR_PENDING: [Self; 3] = [Self::Submitted, Self::MustRetry, Self::Approved];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Ready => "ready",
            Self::Submitted => "submitted",
            Self::MustRetry => "must_retry",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Denied)
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| VerificationError::UnknownStatus(s.to_owned()))
    }
}

/// Operations that move an attempt between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    UploadFaceImage,
    UploadPhotoIdImage,
    MarkReady,
    Submit,
    Approve,
    Deny,
    SystemError,
}

impl Transition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UploadFaceImage => "upload_face_image",
            Self::UploadPhotoIdImage => "upload_photo_id_image",
            Self::MarkReady => "mark_ready",
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Deny => "deny",
            Self::SystemError => "system_error",
        }
    }

    /// Source statuses from which the transition is legal.
    pub fn allowed_from(self) -> &'static [VerificationStatus] {
        use VerificationStatus::*;
        match self {
            Self::UploadFaceImage | Self::UploadPhotoIdImage => &[Created],
            Self::MarkReady => &[Created, MustRetry],
            Self::Submit => &[Ready],
            Self::Approve | Self::Deny | Self::SystemError => &[Submitted, MustRetry],
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures of the verification state machine itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    #[error("cannot {action} an attempt in status {from}")]
    InvalidTransition {
        action: Transition,
        from: VerificationStatus,
    },
    #[error("face image and photo ID image are both required")]
    MissingImages,
    #[error("profile name is required")]
    MissingName,
    #[error("unknown verification status {0:?}")]
    UnknownStatus(String),
}

/// What the vendor made of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// 2xx response.
    Accepted,
    /// The vendor answered with a non-2xx status.
    Rejected { status: u16, body: String },
    /// The request never got an answer (connect error, timeout).
    Unavailable(String),
}

/// Body posted to the verification vendor. Every field must be non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorSubmission {
    #[serde(rename = "EdX-ID")]
    pub receipt_id: String,
    #[serde(rename = "ExpectedName")]
    pub expected_name: String,
    #[serde(rename = "PhotoID")]
    pub photo_id_url: String,
    #[serde(rename = "PhotoIDKey")]
    pub photo_id_key: String,
    #[serde(rename = "SendResponseTo")]
    pub send_response_to: String,
    #[serde(rename = "UserPhoto")]
    pub user_photo_url: String,
    #[serde(rename = "UserPhotoKey")]
    pub user_photo_key: String,
}

/// Verdict reported by the vendor callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewResult {
    Pass,
    Fail,
    SystemFail,
}

impl ReviewResult {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PASS" => Some(Self::Pass),
            "FAIL" => Some(Self::Fail),
            "SYSTEM FAIL" => Some(Self::SystemFail),
            _ => None,
        }
    }

    /// Status an attempt ends up in once the result is applied.
    pub fn target_status(self) -> VerificationStatus {
        match self {
            Self::Pass => VerificationStatus::Approved,
            Self::Fail => VerificationStatus::Denied,
            Self::SystemFail => VerificationStatus::MustRetry,
        }
    }
}

/// One user's identity verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoVerification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: VerificationStatus,
    pub status_changed_at: DateTime<Utc>,
    /// Profile name frozen by `mark_ready`; empty until then.
    pub name: String,
    pub face_image_url: String,
    pub photo_id_image_url: String,
    pub photo_id_key: String,
    pub receipt_id: String,
    pub error_msg: String,
    pub error_code: String,
    pub reviewing_service: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PhotoVerification {
    pub fn new(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            status: VerificationStatus::Created,
            status_changed_at: now,
            name: String::new(),
            face_image_url: String::new(),
            photo_id_image_url: String::new(),
            photo_id_key: String::new(),
            receipt_id: Uuid::new_v4().to_string(),
            error_msg: String::new(),
            error_code: String::new(),
            reviewing_service: String::new(),
            submitted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fails with `InvalidTransition` unless `action` is legal from the current status.
    pub fn ensure_can(&self, action: Transition) -> Result<(), VerificationError> {
        if action.allowed_from().contains(&self.status) {
            Ok(())
        } else {
            Err(VerificationError::InvalidTransition {
                action,
                from: self.status,
            })
        }
    }

    fn move_to(&mut self, status: VerificationStatus, now: DateTime<Utc>) {
        if self.status != status {
            self.status_changed_at = now;
        }
        self.status = status;
        self.updated_at = now;
    }

    pub fn has_images(&self) -> bool {
        !self.face_image_url.is_empty() && !self.photo_id_image_url.is_empty()
    }

    pub fn attach_face_image(
        &mut self,
        url: String,
        now: DateTime<Utc>,
    ) -> Result<(), VerificationError> {
        self.ensure_can(Transition::UploadFaceImage)?;
        self.face_image_url = url;
        self.updated_at = now;
        Ok(())
    }

    pub fn attach_photo_id_image(
        &mut self,
        url: String,
        wrapped_key: String,
        now: DateTime<Utc>,
    ) -> Result<(), VerificationError> {
        self.ensure_can(Transition::UploadPhotoIdImage)?;
        self.photo_id_image_url = url;
        self.photo_id_key = wrapped_key;
        self.updated_at = now;
        Ok(())
    }

    /// `created | must_retry → ready`. Copies `profile_name` into the attempt the first
    /// time; a name frozen by an earlier `mark_ready` is never replaced.
    pub fn mark_ready(
        &mut self,
        profile_name: &str,
        now: DateTime<Utc>,
    ) -> Result<(), VerificationError> {
        self.ensure_can(Transition::MarkReady)?;
        if !self.has_images() {
            return Err(VerificationError::MissingImages);
        }
        if self.name.is_empty() {
            let name = profile_name.trim();
            if name.is_empty() {
                return Err(VerificationError::MissingName);
            }
            self.name = name.to_owned();
        }
        self.move_to(VerificationStatus::Ready, now);
        Ok(())
    }

    /// Legality check run before the vendor is contacted.
    pub fn check_can_submit(&self) -> Result<(), VerificationError> {
        self.ensure_can(Transition::Submit)
    }

    /// `ready → submitted`, or `ready → must_retry` when the vendor did not accept.
    pub fn submit(
        &mut self,
        outcome: &SubmissionOutcome,
        now: DateTime<Utc>,
    ) -> Result<(), VerificationError> {
        self.ensure_can(Transition::Submit)?;
        match outcome {
            SubmissionOutcome::Accepted => {
                self.submitted_at = Some(now);
                self.error_msg.clear();
                self.error_code.clear();
                self.move_to(VerificationStatus::Submitted, now);
            }
            SubmissionOutcome::Rejected { status, body } => {
                self.error_msg = if body.trim().is_empty() {
                    format!("vendor responded with HTTP {status}")
                } else {
                    body.clone()
                };
                self.move_to(VerificationStatus::MustRetry, now);
            }
            SubmissionOutcome::Unavailable(reason) => {
                self.error_msg = reason.clone();
                self.move_to(VerificationStatus::MustRetry, now);
            }
        }
        Ok(())
    }

    /// `submitted | must_retry → approved`.
    pub fn approve(
        &mut self,
        reviewing_service: &str,
        now: DateTime<Utc>,
    ) -> Result<(), VerificationError> {
        self.ensure_can(Transition::Approve)?;
        self.error_msg.clear();
        self.error_code.clear();
        self.reviewing_service = reviewing_service.to_owned();
        self.move_to(VerificationStatus::Approved, now);
        Ok(())
    }

    /// `submitted | must_retry → denied`, keeping the vendor's reasons.
    pub fn deny(
        &mut self,
        error_msg: &str,
        error_code: &str,
        reviewing_service: &str,
        now: DateTime<Utc>,
    ) -> Result<(), VerificationError> {
        self.ensure_can(Transition::Deny)?;
        self.error_msg = error_msg.to_owned();
        self.error_code = error_code.to_owned();
        self.reviewing_service = reviewing_service.to_owned();
        self.move_to(VerificationStatus::Denied, now);
        Ok(())
    }

    /// `submitted | must_retry → must_retry`, recording the message.
    /// An attempt that already reached approved or denied is left untouched.
    pub fn system_error(
        &mut self,
        error_msg: &str,
        error_code: &str,
        reviewing_service: &str,
        now: DateTime<Utc>,
    ) -> Result<(), VerificationError> {
        if self.status.is_terminal() {
            return Ok(());
        }
        self.ensure_can(Transition::SystemError)?;
        self.error_msg = error_msg.to_owned();
        self.error_code = error_code.to_owned();
        self.reviewing_service = reviewing_service.to_owned();
        self.move_to(VerificationStatus::MustRetry, now);
        Ok(())
    }
}

/// Answer to "does this user still need to verify?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationSummary {
    pub is_verified: bool,
    pub has_valid_or_pending: bool,
    pub active_attempt_id: Option<Uuid>,
}

/// Default window, in days, during which an approved verification stays valid.
pub const DEFAULT_DAYS_GOOD_FOR: i64 = 365;

/// Longest accepted profile name, in characters.
pub const MAX_NAME_LEN: usize = 255;
