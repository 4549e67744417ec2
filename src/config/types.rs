// Configuration types module
// Shape of the config file; defaults are filled in by `Config::load_from`

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub static_files: StaticFilesConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

/// Listen address and runtime size
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads; CPU core count when unset
    pub workers: Option<usize>,
}

/// Location of the creature store
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// SQLite file; relative paths resolve against the executable's directory
    pub path: String,
}

/// Static asset mount
#[derive(Debug, Deserialize, Clone)]
pub struct StaticFilesConfig {
    /// URL prefix, e.g. `/static`
    pub prefix: String,
    /// Directory served under the prefix
    pub dir: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
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

/// Connection limits, all durations in seconds
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Idle time allowed between requests on one connection; zero disables keep-alive
    pub keep_alive_timeout: u64,
    /// Time allowed for request headers when keep-alive is off
    pub read_timeout: u64,
    /// Upper bound on handling one request, and the shutdown drain period
    pub write_timeout: u64,
    /// Unlimited when unset
    pub max_connections: Option<u64>,
}

/// Response headers and request guards
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Value of the `Server` header
    pub server_name: String,
    /// Adds `Access-Control-Allow-Origin: *` to every response
    pub enable_cors: bool,
    /// Requests declaring a larger `Content-Length` get 413
    pub max_body_size: u64,
}
