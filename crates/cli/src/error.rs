use engine_config::settings::error::SettingsError;
use engine_processing::error::EnvelopeError;
use engine_runtime::error::WorkerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid worker settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Worker failed: {0}")]
    Worker(#[from] WorkerError),

    #[error("Failed to decode envelope: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
