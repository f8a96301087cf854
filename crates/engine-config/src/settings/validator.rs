use crate::settings::{error::SettingsError, validated::WorkerSettings};
use tracing::{info, warn};

const LARGE_CHUNK_WARNING: usize = 10_000;

/// Checks a fully populated settings value before the worker is built.
#[derive(Debug, Default)]
pub struct SettingsValidator;

impl SettingsValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, settings: WorkerSettings) -> Result<WorkerSettings, SettingsError> {
        let mut errors: Vec<String> = Vec::new();

        self.validate_chunk_size(&settings, &mut errors);
        self.validate_channels(&settings, &mut errors);
        self.validate_concurrency(&settings, &mut errors);
        self.validate_field_keys(&settings, &mut errors);

        if settings.publish_retry.max_attempts == 0 {
            errors.push("publish_retry.max_attempts must be at least 1".to_string());
        }

        if !errors.is_empty() {
            return Err(SettingsError::ValidationFailed(errors));
        }

        info!(
            chunk_size = settings.chunk_size,
            inbound = %settings.inbound_channel,
            outbound = %settings.outbound_channel,
            max_concurrent_shards = settings.max_concurrent_shards,
            "Worker settings validated"
        );

        Ok(settings)
    }

    fn validate_chunk_size(&self, settings: &WorkerSettings, errors: &mut Vec<String>) {
        if settings.chunk_size == 0 {
            errors.push("chunk_size must be at least 1".to_string());
        } else if settings.chunk_size > LARGE_CHUNK_WARNING {
            warn!(
                chunk_size = settings.chunk_size,
                "Chunk size is very large, store calls may be slow and memory heavy"
            );
        }
    }

    fn validate_channels(&self, settings: &WorkerSettings, errors: &mut Vec<String>) {
        if settings.inbound_channel.trim().is_empty() {
            errors.push("inbound_channel must not be empty".to_string());
        }
        if settings.outbound_channel.trim().is_empty() {
            errors.push("outbound_channel must not be empty".to_string());
        }
    }

    fn validate_concurrency(&self, settings: &WorkerSettings, errors: &mut Vec<String>) {
        if settings.max_concurrent_shards == 0 {
            errors.push("max_concurrent_shards must be at least 1".to_string());
        }
        if settings.mailbox_capacity == 0 {
            errors.push("mailbox_capacity must be at least 1".to_string());
        }
    }

    fn validate_field_keys(&self, settings: &WorkerSettings, errors: &mut Vec<String>) {
        let keys = &settings.field_keys;
        for (name, key) in [
            ("field_keys.identity", &keys.identity),
            ("field_keys.content_type", &keys.content_type),
            ("field_keys.owner", &keys.owner),
            ("field_keys.payload", &keys.payload),
        ] {
            if key.is_empty() {
                errors.push(format!("{name} must not be empty"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_valid_defaults() {
        let settings = WorkerSettings::builder().build().unwrap();
        assert_eq!(settings.chunk_size(), 100);
    }

    #[test]
    fn test_collects_all_errors() {
        let err = WorkerSettings::builder()
            .chunk_size(0)
            .inbound_channel("  ")
            .max_concurrent_shards(0)
            .build()
            .unwrap_err();

        match err {
            SettingsError::ValidationFailed(errors) => {
                assert_eq!(errors.len(), 3);
                assert!(errors.iter().any(|e| e.contains("chunk_size")));
                assert!(errors.iter().any(|e| e.contains("inbound_channel")));
                assert!(errors.iter().any(|e| e.contains("max_concurrent_shards")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[traced_test]
    #[test]
    fn test_large_chunk_warns() {
        let settings = WorkerSettings::builder().chunk_size(50_000).build().unwrap();
        assert_eq!(settings.chunk_size(), 50_000);
        assert!(logs_contain("Chunk size is very large"));
    }
}
