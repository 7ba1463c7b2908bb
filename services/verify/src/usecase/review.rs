use chrono::Utc;
use serde::Deserialize;

use crate::domain::repository::VerificationRepository;
use crate::domain::types::{PhotoVerification, ReviewResult};
use crate::error::VerifyServiceError;
use crate::infra::crypto::{signing_message, verify_authorization};

/// Raw vendor callback as received over HTTP.
pub struct VendorCallback<'a> {
    pub authorization: Option<&'a str>,
    pub content_type: &'a str,
    pub date: &'a str,
    pub body: &'a [u8],
}

#[derive(Deserialize)]
struct ResultBody {
    #[serde(rename = "EdX-ID")]
    receipt_id: String,
    #[serde(rename = "Result")]
    result: String,
    #[serde(rename = "Reason", default)]
    reason: serde_json::Value,
    #[serde(rename = "MessageType", default)]
    message_type: String,
}

fn reason_text(reason: &serde_json::Value) -> String {
    match reason {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Apply a signed PASS / FAIL / SYSTEM FAIL verdict to the attempt it names.
pub struct HandleVendorResultUseCase<R: VerificationRepository> {
    pub repo: R,
    pub access_key: String,
    pub secret_key: String,
    pub reviewing_service: String,
}

impl<R: VerificationRepository> HandleVendorResultUseCase<R> {
    pub async fn execute(
        &self,
        callback: VendorCallback<'_>,
    ) -> Result<PhotoVerification, VerifyServiceError> {
        let value: serde_json::Value = serde_json::from_slice(callback.body)
            .map_err(|e| VerifyServiceError::InvalidCallback(e.to_string()))?;
        let fields = value
            .as_object()
            .ok_or_else(|| VerifyServiceError::InvalidCallback("body is not an object".into()))?;

        let message = signing_message("POST", callback.content_type, callback.date, fields);
        let authorized = callback.authorization.is_some_and(|header| {
            verify_authorization(header, &self.access_key, &self.secret_key, &message)
        });
        if !authorized {
            return Err(VerifyServiceError::InvalidSignature);
        }

        let body: ResultBody = serde_json::from_value(value.clone())
            .map_err(|e| VerifyServiceError::InvalidCallback(e.to_string()))?;
        let result = ReviewResult::parse(&body.result).ok_or_else(|| {
            VerifyServiceError::InvalidCallback(format!("unknown result {:?}", body.result))
        })?;

        let mut attempt = self
            .repo
            .find_by_receipt_id(&body.receipt_id)
            .await?
            .ok_or(VerifyServiceError::AttemptNotFound)?;

        // Vendors redeliver; a verdict that is already applied is acknowledged as is.
        if attempt.status == result.target_status() {
            return Ok(attempt);
        }

        let previous = attempt.status;
        let reason = reason_text(&body.reason);
        let now = Utc::now();
        match result {
            ReviewResult::Pass => attempt.approve(&self.reviewing_service, now)?,
            ReviewResult::Fail => {
                attempt.deny(&reason, &body.message_type, &self.reviewing_service, now)?
            }
            ReviewResult::SystemFail => {
                attempt.system_error(&reason, &body.message_type, &self.reviewing_service, now)?
            }
        }
        if attempt.status != previous {
            self.repo.save(&attempt, previous).await?;
        }

        tracing::info!(
            receipt_id = %attempt.receipt_id,
            result = %body.result,
            status = %attempt.status,
            "applied vendor result"
        );
        Ok(attempt)
    }
}
