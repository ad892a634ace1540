use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    events::MessageFinalizedEvent,
    models::Message,
    repositories::{AuditLogRepository, MessageRepository},
};

#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: Arc<RwLock<HashMap<Uuid, Message>>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn insert(&self, message: &Message) -> anyhow::Result<()> {
        let mut messages = self.messages.write().await;
        if messages.contains_key(&message.id) {
            anyhow::bail!("message {} already exists", message.id);
        }
        messages.insert(message.id, message.clone());
        Ok(())
    }

    async fn update(&self, message: &Message) -> anyhow::Result<()> {
        let mut messages = self.messages.write().await;
        messages.insert(message.id, message.clone());
        Ok(())
    }

    async fn get(&self, message_id: Uuid) -> anyhow::Result<Option<Message>> {
        let messages = self.messages.read().await;
        Ok(messages.get(&message_id).cloned())
    }
}

/// Audit log kept in process memory, partitioned like the file-backed one.
#[derive(Default)]
pub struct InMemoryAuditLog {
    days: Arc<RwLock<HashMap<NaiveDate, Vec<MessageFinalizedEvent>>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryAuditLog {
    async fn append(&self, event: &MessageFinalizedEvent) -> anyhow::Result<()> {
        let mut days = self.days.write().await;
        days.entry(event.logged_at.date_naive())
            .or_default()
            .push(event.clone());
        Ok(())
    }

    async fn read_day(&self, day: NaiveDate) -> anyhow::Result<Vec<MessageFinalizedEvent>> {
        let days = self.days.read().await;
        Ok(days.get(&day).cloned().unwrap_or_default())
    }
}
