use thiserror::Error;

/// Failures raised by a durable store when writing a chunk.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The store refused one or more entities; nothing from the chunk was kept.
    #[error("Store rejected chunk ({count} offending entities): {reason}", count = .identities.len())]
    Rejected {
        identities: Vec<String>,
        reason: String,
    },

    /// The store could not be reached or gave up mid-write.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl SinkError {
    /// Identities of the offending entities, where the store could tell.
    pub fn identities(&self) -> &[String] {
        match self {
            SinkError::Rejected { identities, .. } => identities,
            SinkError::Unavailable(_) => &[],
        }
    }
}

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Authorization code was rejected: {0}")]
    InvalidCode(String),

    #[error("Profile lookup failed: {0}")]
    Lookup(String),
}
