use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{events::MessageFinalizedEvent, models::Message};

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn insert(&self, message: &Message) -> anyhow::Result<()>;

    /// Stores the latest state of a message.
    async fn update(&self, message: &Message) -> anyhow::Result<()>;

    async fn get(&self, message_id: Uuid) -> anyhow::Result<Option<Message>>;
}

/// Append-only record of terminal outcomes, partitioned by UTC day.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn append(&self, event: &MessageFinalizedEvent) -> anyhow::Result<()>;

    /// Returns every entry of the partition, oldest first. A missing partition
    /// reads as empty.
    async fn read_day(&self, day: NaiveDate) -> anyhow::Result<Vec<MessageFinalizedEvent>>;
}
