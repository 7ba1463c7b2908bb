use serde::Deserialize;

use campus_core::config::Config;

use crate::domain::types::DEFAULT_DAYS_GOOD_FOR;

/// Verify service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on (default 3120). Env var: `VERIFY_PORT`.
    #[serde(default = "default_port")]
    pub verify_port: u16,
    /// Endpoint the signed submission is POSTed to.
    pub vendor_api_url: String,
    pub vendor_access_key: String,
    pub vendor_secret_key: String,
    /// PEM (SPKI) public key used to wrap image encryption keys for the vendor.
    pub vendor_rsa_public_key: String,
    /// Recorded as `reviewing_service` on attempts the vendor decides.
    #[serde(default = "default_vendor_name")]
    pub vendor_name: String,
    /// Hex-encoded 32-byte AES key for face images.
    pub face_image_aes_key: String,
    /// Directory encrypted images are written to.
    pub image_store_dir: String,
    /// Public URL prefix under which `image_store_dir` is served.
    pub image_base_url: String,
    /// URL the vendor posts its verdict back to (`SendResponseTo`).
    pub callback_url: String,
    /// How long an approval stays valid.
    #[serde(default = "default_days_good_for")]
    pub days_good_for: i64,
    /// Seconds between passes of the must_retry resubmission job.
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,
    /// Attempts picked up per resubmission pass.
    #[serde(default = "default_retry_batch_size")]
    pub retry_batch_size: u64,
    /// Largest accepted image upload, in bytes.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
}

impl Config for VerifyConfig {}

fn default_port() -> u16 {
    3120
}

fn default_vendor_name() -> String {
    "SoftwareSecure".to_owned()
}

fn default_days_good_for() -> i64 {
    DEFAULT_DAYS_GOOD_FOR
}

fn default_retry_interval_secs() -> u64 {
    300
}

fn default_retry_batch_size() -> u64 {
    50
}

fn default_max_image_bytes() -> usize {
    10 * 1024 * 1024
}
