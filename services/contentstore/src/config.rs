use serde::Deserialize;

use campus_core::config::Config;

/// Content store configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentStoreConfig {
    /// Redis URL for import status records.
    pub redis_url: String,
    /// Root directory installed courses live under.
    pub data_dir: String,
    /// TCP port to listen on (default 3122). Env var: `CONTENTSTORE_PORT`.
    #[serde(default = "default_port")]
    pub contentstore_port: u16,
    /// Lifetime of an import status record.
    #[serde(default = "default_import_status_ttl_secs")]
    pub import_status_ttl_secs: u64,
    /// Largest accepted archive upload, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Config for ContentStoreConfig {}

fn default_port() -> u16 {
    3122
}

fn default_import_status_ttl_secs() -> u64 {
    3600
}

fn default_max_upload_bytes() -> usize {
    100 * 1024 * 1024
}
