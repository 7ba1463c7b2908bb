use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;

use crate::domain::repository::MailTransport;
use crate::domain::types::{EmailMessage, SendError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MailAddress<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailBody<'a> {
    sender: MailAddress<'a>,
    to: [MailAddress<'a>; 1],
    subject: &'a str,
    html_content: &'a str,
}

/// Transactional mail API client (`POST` JSON, `api-key` header).
#[derive(Clone)]
pub struct HttpMailTransport {
    pub client: reqwest::Client,
    pub api_url: String,
    pub api_key: String,
    pub sender_email: String,
    pub sender_name: String,
}

/// 429 and 5xx are worth retrying; other non-2xx answers are final.
pub fn classify_status(status: StatusCode) -> Option<SendError> {
    if status.is_success() {
        None
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        Some(SendError::Transient(format!("mail API returned {status}")))
    } else {
        Some(SendError::Permanent(format!("mail API returned {status}")))
    }
}

impl HttpMailTransport {
    fn body<'a>(&'a self, message: &'a EmailMessage) -> SendEmailBody<'a> {
        SendEmailBody {
            sender: MailAddress {
                email: &self.sender_email,
                name: &self.sender_name,
            },
            to: [MailAddress {
                email: &message.to_email,
                name: &message.to_name,
            }],
            subject: &message.subject,
            html_content: &message.html_body,
        }
    }
}

impl MailTransport for HttpMailTransport {
    async fn send(&self, message: &EmailMessage) -> Result<(), SendError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&self.body(message))
            .send()
            .await
            .map_err(|e| SendError::Transient(e.to_string()))?;

        match classify_status(response.status()) {
            None => Ok(()),
            Some(err) => {
                let detail = response.text().await.unwrap_or_default();
                tracing::debug!(to = %message.to_email, %detail, "mail API error body");
                Err(err)
            }
        }
    }
}
