use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{errors::DomainError, models::Message, repositories::MessageRepository};

pub struct GetMessageUseCase {
    message_repo: Arc<dyn MessageRepository>,
}

impl GetMessageUseCase {
    pub fn new(message_repo: Arc<dyn MessageRepository>) -> Self {
        Self { message_repo }
    }

    pub async fn execute(&self, message_id: Uuid) -> anyhow::Result<Message> {
        let message = self
            .message_repo
            .get(message_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("message {message_id}")))?;
        Ok(message)
    }
}
