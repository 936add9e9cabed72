// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    /// Largest accepted upload body in bytes, 0 means unlimited
    pub max_upload_size: u64,
}

/// Where the served tree lives and who may write to it.
///
/// Filled from `TOOL_DATA_DIR`, `HOME` and `FILE_API_KEY` when the
/// configuration is loaded, never re-read afterwards.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct StorageConfig {
    /// Preferred base directory, `<tool_data_dir>/public_html` is tried first
    #[serde(default)]
    pub tool_data_dir: Option<String>,
    /// Fallback base directory, `<home_dir>/public_html`
    #[serde(default)]
    pub home_dir: Option<String>,
    /// Shared upload secret; the PUT route exists only when this is set
    #[serde(default)]
    pub write_secret: Option<String>,
}

impl StorageConfig {
    /// Upload secret, treating an empty value as unset
    pub fn write_secret(&self) -> Option<&str> {
        self.write_secret.as_deref().filter(|s| !s.is_empty())
    }
}
