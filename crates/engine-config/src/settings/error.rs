use thiserror::Error;

/// Errors raised while loading or validating worker settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON or has unknown keys.
    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// An environment override could not be parsed.
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidEnv {
        key: String,
        value: String,
        reason: String,
    },

    /// One or more settings failed validation.
    #[error("Settings validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),
}
