use async_trait::async_trait;
use tracing::info;

use crate::{
    application::services::channel::ChannelAdapter,
    domain::models::{Message, SendOutcome},
};

pub const MOCK_CHANNEL: &str = "mock";

/// Accepts everything without any I/O. Only available in test mode.
pub struct MockChannel {
    enabled: bool,
}

impl MockChannel {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    fn name(&self) -> &str {
        MOCK_CHANNEL
    }

    fn is_available(&self) -> bool {
        self.enabled
    }

    async fn send(&self, message: &Message) -> SendOutcome {
        if !self.enabled {
            return SendOutcome::failed("mock channel is disabled");
        }
        info!(
            message_id = %message.id,
            recipient = %message.recipient,
            payload = %message.payload.summary(),
            "mock channel accepted message"
        );
        SendOutcome::delivered(Some(format!("mock-{}", message.id)))
    }
}
