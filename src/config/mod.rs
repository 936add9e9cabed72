// Configuration module entry point
// Loads application configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, StorageConfig};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Environment variable naming the preferred data directory
pub const ENV_TOOL_DATA_DIR: &str = "TOOL_DATA_DIR";
/// Environment variable naming the fallback home directory
pub const ENV_HOME: &str = "HOME";
/// Environment variable holding the upload secret
pub const ENV_FILE_API_KEY: &str = "FILE_API_KEY";

impl Config {
    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// Load configuration, taking the storage variables from `env`
    ///
    /// Empty values are treated as unset.
    pub fn load_with_env(
        config_path: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, config::ConfigError> {
        let lookup = |key: &str| env(key).filter(|v| !v.is_empty());

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "public-html-server")?
            .set_default("http.max_upload_size", 1_073_741_824)? // 1GiB
            .set_override_option("storage.tool_data_dir", lookup(ENV_TOOL_DATA_DIR))?
            .set_override_option("storage.home_dir", lookup(ENV_HOME))?
            .set_override_option("storage.write_secret", lookup(ENV_FILE_API_KEY))?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
