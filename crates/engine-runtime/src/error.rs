use thiserror::Error;

/// Errors surfaced by [`crate::worker::Worker::run`].
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Actor error: {0}")]
    Actor(#[from] ActorError),

    /// The worker actor's task was cancelled or panicked.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Common error type for all actors in the runtime.
#[derive(Debug, Error)]
pub enum ActorError {
    #[error("Mailbox closed")]
    MailboxClosed,

    #[error("Actor internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The other end went away; nothing sent now can be delivered.
    #[error("Channel '{0}' is closed")]
    Closed(String),

    /// The channel could not take the message right now.
    #[error("Channel '{0}' is busy")]
    Busy(String),
}
