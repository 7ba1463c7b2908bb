use serde::Deserialize;

use campus_core::config::Config;

/// Bulk email service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkEmailConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on (default 3121). Env var: `BULK_EMAIL_PORT`.
    #[serde(default = "default_port")]
    pub bulk_email_port: u16,
    /// Transactional mail API endpoint.
    pub mail_api_url: String,
    pub mail_api_key: String,
    pub sender_email: String,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    /// Recipients per subtask.
    #[serde(default = "default_emails_per_task")]
    pub emails_per_task: usize,
    /// Transient failures tolerated per subtask before its remaining recipients fail.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base of the exponential retry delay.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    /// Seconds between queue polls when idle.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Config for BulkEmailConfig {}

fn default_port() -> u16 {
    3121
}

fn default_sender_name() -> String {
    "Campus".to_owned()
}

fn default_emails_per_task() -> usize {
    100
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay_secs() -> u64 {
    15
}

fn default_poll_interval_secs() -> u64 {
    5
}
