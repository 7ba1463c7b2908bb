use anyhow::{Context as _, anyhow};
use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, DATE};

use crate::domain::repository::VerificationVendor;
use crate::domain::types::{SubmissionOutcome, VendorSubmission};
use crate::infra::crypto::{authorization_header, signing_message};

const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP client for the identity review vendor.
#[derive(Clone)]
pub struct HttpVerificationVendor {
    pub client: reqwest::Client,
    pub api_url: String,
    pub access_key: String,
    pub secret_key: String,
}

/// HTTP date in the `Date` header format, e.g. `Thu, 01 Jan 2026 00:00:00 GMT`.
pub fn http_date() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

impl HttpVerificationVendor {
    /// Serialized body plus the `Date` and `Authorization` headers that sign it.
    pub fn signed_request(
        &self,
        submission: &VendorSubmission,
    ) -> anyhow::Result<(String, String, String)> {
        let value = serde_json::to_value(submission).context("serialize submission")?;
        let fields = value
            .as_object()
            .ok_or_else(|| anyhow!("submission is not a JSON object"))?;
        let date = http_date();
        let message = signing_message("POST", JSON_CONTENT_TYPE, &date, fields);
        let authorization = authorization_header(&self.access_key, &self.secret_key, &message)?;
        Ok((value.to_string(), date, authorization))
    }
}

impl VerificationVendor for HttpVerificationVendor {
    async fn submit(&self, submission: &VendorSubmission) -> SubmissionOutcome {
        let (body, date, authorization) = match self.signed_request(submission) {
            Ok(parts) => parts,
            Err(e) => return SubmissionOutcome::Unavailable(format!("{e:#}")),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(DATE, date)
            .header(AUTHORIZATION, authorization)
            .body(body)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!(receipt_id = %submission.receipt_id, "submitted to vendor");
                SubmissionOutcome::Accepted
            }
            Ok(resp) => {
                let status = resp.status().as_u16();
                let body = resp.text().await.unwrap_or_default();
                tracing::warn!(
                    receipt_id = %submission.receipt_id,
                    status,
                    "vendor rejected submission"
                );
                SubmissionOutcome::Rejected { status, body }
            }
            Err(e) => {
                tracing::warn!(
                    receipt_id = %submission.receipt_id,
                    error = %e,
                    "vendor unreachable"
                );
                SubmissionOutcome::Unavailable(e.to_string())
            }
        }
    }
}
