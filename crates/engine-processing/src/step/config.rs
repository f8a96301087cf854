use engine_config::settings::validated::{DEFAULT_CHUNK_SIZE, WorkerSettings};
use model::records::keys::FieldKeys;

/// Per-step knobs, derived from the worker settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepConfig {
    pub chunk_size: usize,
    pub field_keys: FieldKeys,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            field_keys: FieldKeys::default(),
        }
    }
}

impl StepConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl From<&WorkerSettings> for StepConfig {
    fn from(settings: &WorkerSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size().max(1),
            field_keys: settings.field_keys().clone(),
        }
    }
}
