use crate::actor::{Actor, ActorContext, ActorRef};
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::error;

/// Spawns the actor's event loop on a Tokio task.
///
/// The loop ends once every `ActorRef` has been dropped and the mailbox is drained.
pub fn spawn_actor<M, A>(
    name: impl Into<String>,
    mailbox_capacity: usize,
    mut actor: A,
) -> (ActorRef<M>, JoinHandle<()>)
where
    A: Actor<M>,
    M: Send + 'static,
{
    let name: Arc<str> = Arc::from(name.into());
    let capacity = mailbox_capacity.max(1);
    let ctx = ActorContext::new(name.clone(), capacity);
    let (tx, mut rx) = mpsc::channel::<M>(capacity);
    let actor_ref = ActorRef::new(name, tx);

    let handle = tokio::spawn(async move {
        if let Err(e) = actor.on_start(&ctx).await {
            error!(actor = %ctx.name(), ?e, "actor on_start failed");
            return;
        }

        while let Some(msg) = rx.recv().await {
            if let Err(e) = actor.handle(msg, &ctx).await {
                error!(actor = %ctx.name(), ?e, "actor handle failed");
            }
        }

        if let Err(e) = actor.on_stop(&ctx).await {
            error!(actor = %ctx.name(), ?e, "actor on_stop failed");
        }
    });

    (actor_ref, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActorError;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    struct Ping(u32);

    struct Recorder {
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Actor<Ping> for Recorder {
        async fn on_start(&mut self, _ctx: &ActorContext) -> Result<(), ActorError> {
            self.seen.lock().unwrap().push("start".into());
            Ok(())
        }

        async fn handle(&mut self, msg: Ping, _ctx: &ActorContext) -> Result<(), ActorError> {
            if msg.0 == 0 {
                return Err(ActorError::Internal("zero".into()));
            }
            self.seen.lock().unwrap().push(msg.0.to_string());
            Ok(())
        }

        async fn on_stop(&mut self, _ctx: &ActorContext) -> Result<(), ActorError> {
            self.seen.lock().unwrap().push("stop".into());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_lifecycle_runs_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (actor_ref, handle) = spawn_actor(
            "recorder",
            4,
            Recorder {
                seen: seen.clone(),
            },
        );

        assert_eq!(actor_ref.name(), "recorder");
        actor_ref.send(Ping(1)).await.unwrap();
        actor_ref.send(Ping(0)).await.unwrap();
        actor_ref.send(Ping(2)).await.unwrap();
        drop(actor_ref);
        handle.await.unwrap();

        // A failing message does not stop the loop.
        assert_eq!(*seen.lock().unwrap(), vec!["start", "1", "2", "stop"]);
    }
}
