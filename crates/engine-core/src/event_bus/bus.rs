use model::events::Event;
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};

type SenderMap = HashMap<u64, Box<dyn Any + Send + Sync>>;

/// A subscription handle that can be used to unsubscribe from events.
#[derive(Debug, Clone)]
pub struct Subscription {
    event_type_id: TypeId,
    subscriber_id: u64,
}

/// Typed fan-out of step lifecycle events.
///
/// Publishing never blocks: a subscriber whose channel is full misses
/// the event.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<HashMap<TypeId, SenderMap>>>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe<E>(&self, sender: mpsc::Sender<Arc<E>>) -> Subscription
    where
        E: Event + Clone,
    {
        let event_type_id = TypeId::of::<E>();
        let subscriber_id = self.next_id.fetch_add(1, Ordering::Relaxed);

        self.subscribers
            .write()
            .await
            .entry(event_type_id)
            .or_default()
            .insert(subscriber_id, Box::new(sender));

        debug!(
            event_type = std::any::type_name::<E>(),
            subscriber_id, "Subscribed to event"
        );

        Subscription {
            event_type_id,
            subscriber_id,
        }
    }

    /// Convenience wrapper returning a fresh receiver.
    pub async fn channel<E>(&self, capacity: usize) -> (Subscription, mpsc::Receiver<Arc<E>>)
    where
        E: Event + Clone,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (self.subscribe(tx).await, rx)
    }

    /// Publishes `event` and returns how many subscribers received it.
    pub async fn publish<E>(&self, event: E) -> usize
    where
        E: Event + Clone,
    {
        let subscribers = self.subscribers.read().await;
        let Some(type_subscribers) = subscribers.get(&TypeId::of::<E>()) else {
            return 0;
        };

        let event = Arc::new(event);
        let mut delivered = 0;
        for (subscriber_id, boxed_sender) in type_subscribers {
            let Some(sender) = boxed_sender.downcast_ref::<mpsc::Sender<Arc<E>>>() else {
                warn!(subscriber_id, "Failed to downcast sender for subscriber");
                continue;
            };

            match sender.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => warn!(
                    event_type = event.event_type(),
                    subscriber_id,
                    error = %e,
                    "Dropped event for slow or closed subscriber"
                ),
            }
        }
        delivered
    }

    pub async fn unsubscribe(&self, subscription: Subscription) {
        let mut subscribers = self.subscribers.write().await;

        if let Some(type_subscribers) = subscribers.get_mut(&subscription.event_type_id) {
            type_subscribers.remove(&subscription.subscriber_id);
            if type_subscribers.is_empty() {
                subscribers.remove(&subscription.event_type_id);
            }
        }
    }

    pub async fn subscriber_count<E>(&self) -> usize
    where
        E: Event,
    {
        self.subscribers
            .read()
            .await
            .get(&TypeId::of::<E>())
            .map(|subs| subs.len())
            .unwrap_or(0)
    }
}
