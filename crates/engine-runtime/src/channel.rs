use crate::error::ChannelError;
use async_trait::async_trait;
use engine_processing::envelope::{InboundMessage, OutboundMessage};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Source of shard requests.
///
/// `receive` must be cancel safe: the worker races it against shutdown.
#[async_trait]
pub trait InboundChannel: Send {
    fn name(&self) -> &str;

    /// Next message, or `None` once the channel is closed and drained.
    async fn receive(&mut self) -> Option<InboundMessage>;
}

/// Destination for status reports.
#[async_trait]
pub trait OutboundChannel: Send + Sync {
    fn name(&self) -> &str;

    async fn publish(&self, message: OutboundMessage) -> Result<(), ChannelError>;
}

/// Sending half of an in-process channel.
#[derive(Debug)]
pub struct MemorySender<T> {
    name: Arc<str>,
    tx: mpsc::Sender<T>,
}

impl<T> Clone for MemorySender<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            tx: self.tx.clone(),
        }
    }
}

impl<T: Send> MemorySender<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Waits for capacity, then sends.
    pub async fn send(&self, item: T) -> Result<(), ChannelError> {
        self.tx
            .send(item)
            .await
            .map_err(|_| ChannelError::Closed(self.name.to_string()))
    }

    /// Sends only if there is capacity right now.
    pub fn try_send(&self, item: T) -> Result<(), ChannelError> {
        self.tx.try_send(item).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ChannelError::Busy(self.name.to_string()),
            mpsc::error::TrySendError::Closed(_) => ChannelError::Closed(self.name.to_string()),
        })
    }
}

/// Receiving half of an in-process channel.
#[derive(Debug)]
pub struct MemoryReceiver<T> {
    name: Arc<str>,
    rx: mpsc::Receiver<T>,
}

impl<T> MemoryReceiver<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    pub fn close(&mut self) {
        self.rx.close();
    }
}

/// A bounded in-process channel named `name`.
pub fn memory_channel<T>(
    name: impl Into<String>,
    capacity: usize,
) -> (MemorySender<T>, MemoryReceiver<T>) {
    let name: Arc<str> = Arc::from(name.into());
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        MemorySender {
            name: name.clone(),
            tx,
        },
        MemoryReceiver { name, rx },
    )
}

#[async_trait]
impl InboundChannel for MemoryReceiver<InboundMessage> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn receive(&mut self) -> Option<InboundMessage> {
        self.rx.recv().await
    }
}

#[async_trait]
impl OutboundChannel for MemorySender<OutboundMessage> {
    fn name(&self) -> &str {
        &self.name
    }

    /// Never waits: a full channel reports `Busy` so the caller's retry
    /// policy decides what happens next.
    async fn publish(&self, message: OutboundMessage) -> Result<(), ChannelError> {
        self.try_send(message)
    }
}
