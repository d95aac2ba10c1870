// ============================================================================
// Logging Configuration
// ============================================================================

use crate::env_string;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// EnvFilter directive, e.g. "info" or "chatline_shared=debug,info"
    pub rust_log: String,
    pub format: LogFormat,
}

impl LoggingConfig {
    pub(crate) fn from_env() -> Self {
        let format = match env_string("LOG_FORMAT", "json").to_ascii_lowercase().as_str() {
            "pretty" | "text" => LogFormat::Pretty,
            _ => LogFormat::Json,
        };
        Self {
            rust_log: env_string("RUST_LOG", "info"),
            format,
        }
    }
}
