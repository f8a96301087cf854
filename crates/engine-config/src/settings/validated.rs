use crate::settings::{error::SettingsError, validator::SettingsValidator};
use model::records::keys::FieldKeys;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_CHUNK_SIZE: usize = 100;
pub const DEFAULT_MAX_CONCURRENT_SHARDS: usize = 4;
pub const DEFAULT_MAILBOX_CAPACITY: usize = 64;
pub const DEFAULT_INBOUND_CHANNEL: &str = "shard-requests";
pub const DEFAULT_OUTBOUND_CHANNEL: &str = "shard-replies";

/// Backoff used when publishing status reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 5_000,
        }
    }
}

impl RetrySettings {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Immutable, validated configuration the worker is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerSettings {
    /// Records per chunk handed to the store in one call
    pub chunk_size: usize,
    /// Identifier of the channel shard requests arrive on
    pub inbound_channel: String,
    /// Identifier of the channel status reports are published to
    pub outbound_channel: String,
    /// Upper bound on shards processed at the same time
    pub max_concurrent_shards: usize,
    /// Capacity of the worker actor's mailbox
    pub mailbox_capacity: usize,
    /// Keys the transformer reads from raw records
    pub field_keys: FieldKeys,
    /// Backoff for status publication
    pub publish_retry: RetrySettings,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        WorkerSettingsBuilder::default().into_settings()
    }
}

impl WorkerSettings {
    pub fn builder() -> WorkerSettingsBuilder {
        WorkerSettingsBuilder::default()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn inbound_channel(&self) -> &str {
        &self.inbound_channel
    }

    pub fn outbound_channel(&self) -> &str {
        &self.outbound_channel
    }

    pub fn max_concurrent_shards(&self) -> usize {
        self.max_concurrent_shards
    }

    pub fn mailbox_capacity(&self) -> usize {
        self.mailbox_capacity
    }

    pub fn field_keys(&self) -> &FieldKeys {
        &self.field_keys
    }

    pub fn publish_retry(&self) -> &RetrySettings {
        &self.publish_retry
    }
}

#[derive(Debug, Default, Clone)]
pub struct WorkerSettingsBuilder {
    pub chunk_size: Option<usize>,
    pub inbound_channel: Option<String>,
    pub outbound_channel: Option<String>,
    pub max_concurrent_shards: Option<usize>,
    pub mailbox_capacity: Option<usize>,
    pub field_keys: Option<FieldKeys>,
    pub publish_retry: Option<RetrySettings>,
}

impl WorkerSettingsBuilder {
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    pub fn inbound_channel(mut self, name: impl Into<String>) -> Self {
        self.inbound_channel = Some(name.into());
        self
    }

    pub fn outbound_channel(mut self, name: impl Into<String>) -> Self {
        self.outbound_channel = Some(name.into());
        self
    }

    pub fn max_concurrent_shards(mut self, max: usize) -> Self {
        self.max_concurrent_shards = Some(max);
        self
    }

    pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = Some(capacity);
        self
    }

    pub fn field_keys(mut self, keys: FieldKeys) -> Self {
        self.field_keys = Some(keys);
        self
    }

    pub fn publish_retry(mut self, retry: RetrySettings) -> Self {
        self.publish_retry = Some(retry);
        self
    }

    /// Fills unset fields with defaults and validates the result.
    pub fn build(self) -> Result<WorkerSettings, SettingsError> {
        SettingsValidator::new().validate(self.into_settings())
    }

    /// Fills unset fields with defaults without validating.
    pub(crate) fn into_settings(self) -> WorkerSettings {
        WorkerSettings {
            chunk_size: self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
            inbound_channel: self
                .inbound_channel
                .unwrap_or_else(|| DEFAULT_INBOUND_CHANNEL.to_string()),
            outbound_channel: self
                .outbound_channel
                .unwrap_or_else(|| DEFAULT_OUTBOUND_CHANNEL.to_string()),
            max_concurrent_shards: self
                .max_concurrent_shards
                .unwrap_or(DEFAULT_MAX_CONCURRENT_SHARDS),
            mailbox_capacity: self.mailbox_capacity.unwrap_or(DEFAULT_MAILBOX_CAPACITY),
            field_keys: self.field_keys.unwrap_or_default(),
            publish_retry: self.publish_retry.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = WorkerSettings::default();
        assert_eq!(settings.chunk_size(), 100);
        assert_eq!(settings.max_concurrent_shards(), 4);
        assert_eq!(settings.inbound_channel(), "shard-requests");
        assert_eq!(settings.outbound_channel(), "shard-replies");
        assert_eq!(settings.field_keys().identity, "id");
    }

    #[test]
    fn test_builder_overrides() {
        let settings = WorkerSettings::builder()
            .chunk_size(25)
            .inbound_channel("in")
            .max_concurrent_shards(1)
            .into_settings();

        assert_eq!(settings.chunk_size(), 25);
        assert_eq!(settings.inbound_channel(), "in");
        assert_eq!(settings.outbound_channel(), "shard-replies");
        assert_eq!(settings.max_concurrent_shards(), 1);
        assert_eq!(settings.publish_retry().base_delay(), Duration::from_millis(200));
    }
}
