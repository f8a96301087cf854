use crate::settings::{
    error::SettingsError,
    validated::{RetrySettings, WorkerSettingsBuilder},
};
use model::records::keys::FieldKeys;
use serde::Deserialize;
use std::{collections::HashMap, path::Path, str::FromStr};
use tracing::debug;

pub const ENV_PREFIX: &str = "SHARD_WORKER_";
pub const ENV_CHUNK_SIZE: &str = "SHARD_WORKER_CHUNK_SIZE";
pub const ENV_INBOUND_CHANNEL: &str = "SHARD_WORKER_INBOUND_CHANNEL";
pub const ENV_OUTBOUND_CHANNEL: &str = "SHARD_WORKER_OUTBOUND_CHANNEL";
pub const ENV_MAX_CONCURRENT_SHARDS: &str = "SHARD_WORKER_MAX_CONCURRENT_SHARDS";

/// On-disk shape of a settings file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub chunk_size: Option<usize>,
    pub inbound_channel: Option<String>,
    pub outbound_channel: Option<String>,
    pub max_concurrent_shards: Option<usize>,
    pub mailbox_capacity: Option<usize>,
    pub field_keys: Option<FieldKeys>,
    pub publish_retry: Option<RetrySettings>,
}

impl SettingsFile {
    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Overlays every key present in the file onto `builder`.
    pub fn apply(self, mut builder: WorkerSettingsBuilder) -> WorkerSettingsBuilder {
        builder.chunk_size = self.chunk_size.or(builder.chunk_size);
        builder.inbound_channel = self.inbound_channel.or(builder.inbound_channel);
        builder.outbound_channel = self.outbound_channel.or(builder.outbound_channel);
        builder.max_concurrent_shards = self
            .max_concurrent_shards
            .or(builder.max_concurrent_shards);
        builder.mailbox_capacity = self.mailbox_capacity.or(builder.mailbox_capacity);
        builder.field_keys = self.field_keys.or(builder.field_keys);
        builder.publish_retry = self.publish_retry.or(builder.publish_retry);
        builder
    }
}

/// Overlays the `SHARD_WORKER_*` variables found in `vars` onto `builder`.
pub fn apply_env(
    mut builder: WorkerSettingsBuilder,
    vars: &HashMap<String, String>,
) -> Result<WorkerSettingsBuilder, SettingsError> {
    if let Some(size) = parse_var::<usize>(vars, ENV_CHUNK_SIZE)? {
        builder = builder.chunk_size(size);
    }
    if let Some(name) = vars.get(ENV_INBOUND_CHANNEL) {
        builder = builder.inbound_channel(name.clone());
    }
    if let Some(name) = vars.get(ENV_OUTBOUND_CHANNEL) {
        builder = builder.outbound_channel(name.clone());
    }
    if let Some(max) = parse_var::<usize>(vars, ENV_MAX_CONCURRENT_SHARDS)? {
        builder = builder.max_concurrent_shards(max);
    }
    Ok(builder)
}

/// Defaults, then the optional file, then the environment. The result is
/// left unvalidated so callers can layer command-line flags on top.
pub fn load_settings(
    path: Option<&Path>,
    vars: &HashMap<String, String>,
) -> Result<WorkerSettingsBuilder, SettingsError> {
    let mut builder = WorkerSettingsBuilder::default();

    if let Some(path) = path {
        debug!(path = %path.display(), "Loading worker settings file");
        builder = SettingsFile::from_path(path)?.apply(builder);
    }

    apply_env(builder, vars)
}

fn parse_var<T>(vars: &HashMap<String, String>, key: &str) -> Result<Option<T>, SettingsError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match vars.get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| SettingsError::InvalidEnv {
                key: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}
