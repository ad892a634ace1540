use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::{
    application::services::{event_bus::MessageBus, stats::DeliveryStats},
    domain::{
        models::{DeliveryOptions, Message, MessageStatus, Payload},
        repositories::MessageRepository,
        value_objects::Recipient,
    },
};

pub struct SubmitMessageConfig {
    pub max_attempts: u32,
    pub default_country_code: String,
}

pub struct SubmitMessageUseCase {
    message_repo: Arc<dyn MessageRepository>,
    bus: Arc<dyn MessageBus>,
    stats: Arc<DeliveryStats>,
    config: SubmitMessageConfig,
}

pub struct SubmitMessageRequest {
    pub recipient: String,
    pub payload: Payload,
    pub options: DeliveryOptions,
}

#[derive(Debug, Clone)]
pub struct SubmitMessageResponse {
    pub message_id: Uuid,
    pub status: MessageStatus,
    pub queue_position: usize,
}

impl SubmitMessageUseCase {
    pub fn new(
        message_repo: Arc<dyn MessageRepository>,
        bus: Arc<dyn MessageBus>,
        stats: Arc<DeliveryStats>,
        config: SubmitMessageConfig,
    ) -> Self {
        Self {
            message_repo,
            bus,
            stats,
            config,
        }
    }

    /// Validates and enqueues a message. Never waits on delivery; a malformed
    /// recipient or payload is rejected before anything is queued.
    pub async fn execute(
        &self,
        request: SubmitMessageRequest,
    ) -> anyhow::Result<SubmitMessageResponse> {
        let recipient = Recipient::parse(&request.recipient, &self.config.default_country_code)?;
        request.payload.validate()?;

        let message = Message::new(
            recipient,
            request.payload,
            request.options,
            self.config.max_attempts,
        );
        let message_id = message.id;

        self.message_repo.insert(&message).await?;
        let queue_position = self.bus.publish(message).await?;
        self.stats.record_queued();

        debug!(%message_id, queue_position, "message queued");

        Ok(SubmitMessageResponse {
            message_id,
            status: MessageStatus::Queued,
            queue_position,
        })
    }
}
