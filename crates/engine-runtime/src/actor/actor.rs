use crate::error::ActorError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// What an actor knows about itself while it runs.
#[derive(Debug, Clone)]
pub struct ActorContext {
    name: Arc<str>,
    mailbox_capacity: usize,
}

impl ActorContext {
    pub(crate) fn new(name: Arc<str>, mailbox_capacity: usize) -> Self {
        Self {
            name,
            mailbox_capacity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mailbox_capacity(&self) -> usize {
        self.mailbox_capacity
    }
}

/// A task that owns its state and drains one bounded mailbox in order.
///
/// `on_stop` runs after the last [`ActorRef`] is dropped and every queued
/// message has been handled. Work an actor moved onto background tasks must
/// be awaited there, since the actor's task ends right after.
#[async_trait]
pub trait Actor<M>: Send + 'static
where
    M: Send + 'static,
{
    async fn on_start(&mut self, _ctx: &ActorContext) -> Result<(), ActorError> {
        Ok(())
    }

    async fn handle(&mut self, msg: M, ctx: &ActorContext) -> Result<(), ActorError>;

    async fn on_stop(&mut self, _ctx: &ActorContext) -> Result<(), ActorError> {
        Ok(())
    }
}

/// Sending side of an actor's mailbox.
pub struct ActorRef<M> {
    name: Arc<str>,
    tx: mpsc::Sender<M>,
}

impl<M> Clone for ActorRef<M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            tx: self.tx.clone(),
        }
    }
}

impl<M> ActorRef<M>
where
    M: Send + 'static,
{
    pub(crate) fn new(name: Arc<str>, tx: mpsc::Sender<M>) -> Self {
        Self { name, tx }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Messages waiting in the mailbox.
    pub fn queued(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    /// Enqueue `msg`, waiting while the mailbox is full.
    pub async fn send(&self, msg: M) -> Result<(), ActorError> {
        self.tx
            .send(msg)
            .await
            .map_err(|_| ActorError::MailboxClosed)
    }
}
