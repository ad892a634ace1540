use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::{events::MessageFinalizedEvent, models::Message};

const COMPLETION_BUFFER: usize = 256;

#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Enqueues a message and returns its 1-based queue position.
    async fn publish(&self, message: Message) -> anyhow::Result<usize>;

    /// Re-enqueues a message at the back of the queue once `delay` elapsed.
    async fn publish_after(&self, message: Message, delay: Duration) -> anyhow::Result<()>;
}

/// Read-only view of the queue for status reporting.
#[async_trait]
pub trait QueueMonitor: Send + Sync {
    /// Messages waiting, including parked retries.
    async fn depth(&self) -> usize;

    fn is_processing(&self) -> bool;
}

/// Fan-out of terminal outcomes to in-process subscribers.
#[derive(Clone)]
pub struct CompletionFeed {
    sender: broadcast::Sender<MessageFinalizedEvent>,
}

impl Default for CompletionFeed {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(COMPLETION_BUFFER);
        Self { sender }
    }
}

impl CompletionFeed {
    pub fn publish(&self, event: MessageFinalizedEvent) {
        // no subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MessageFinalizedEvent> {
        self.sender.subscribe()
    }
}
