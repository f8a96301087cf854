use serde::{Deserialize, Serialize};
use std::fmt;

/// The three places a reportable failure can originate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The inbound envelope could not be turned into a shard.
    DecodeFailure,
    /// The store rejected a chunk.
    WriteFailure,
    /// The status report could not be serialized.
    EncodeFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::DecodeFailure => write!(f, "DecodeFailure"),
            ErrorKind::WriteFailure => write!(f, "WriteFailure"),
            ErrorKind::EncodeFailure => write!(f, "EncodeFailure"),
        }
    }
}

/// A single error entry in a step status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ErrorDescriptor {
    pub kind: ErrorKind,
    pub message: String,
    /// Zero-based index of the chunk that failed, when the failure is chunk-scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk: Option<usize>,
    /// Identities of the offending entities, where the store could tell.
    #[serde(default)]
    pub identities: Vec<String>,
}

impl ErrorDescriptor {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            chunk: None,
            identities: Vec::new(),
        }
    }

    pub fn with_chunk(mut self, chunk: usize) -> Self {
        self.chunk = Some(chunk);
        self
    }

    pub fn with_identities(mut self, identities: Vec<String>) -> Self {
        self.identities = identities;
        self
    }
}
