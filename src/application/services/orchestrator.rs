use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::{
    application::services::channel::{ChannelAdapter, ChannelRegistry},
    domain::models::{AttemptOutcome, Message, SendOutcome},
};

pub const NO_AVAILABLE_METHODS: &str = "No available sending methods";

/// Runs a single delivery attempt across the registered channels.
///
/// Channels are tried in priority order and the first success wins. Retrying
/// across attempts belongs to the retry policy, not here.
#[derive(Clone)]
pub struct DeliveryOrchestrator {
    registry: ChannelRegistry,
}

impl DeliveryOrchestrator {
    pub fn new(registry: ChannelRegistry) -> Self {
        Self { registry }
    }

    pub async fn attempt_send(&self, message: &Message) -> AttemptOutcome {
        let channels = self
            .registry
            .delivery_order(message.options.preferred_channel.as_deref());

        for channel in channels {
            debug!(message_id = %message.id, channel = channel.name(), "trying channel");
            let outcome = Self::send_isolated(channel.clone(), message).await;
            if outcome.success {
                info!(
                    message_id = %message.id,
                    channel = channel.name(),
                    channel_message_id = outcome.channel_message_id.as_deref().unwrap_or("-"),
                    "message delivered"
                );
                return AttemptOutcome::Delivered {
                    method: channel.name().to_string(),
                    channel_message_id: outcome.channel_message_id,
                };
            }
            warn!(
                message_id = %message.id,
                channel = channel.name(),
                error = outcome.error.as_deref().unwrap_or("unknown error"),
                "channel failed, falling back"
            );
        }

        AttemptOutcome::Exhausted {
            error: NO_AVAILABLE_METHODS.to_string(),
        }
    }

    /// Runs one adapter send on its own task so a panicking adapter counts as
    /// a failed channel instead of taking the worker down.
    async fn send_isolated(channel: Arc<dyn ChannelAdapter>, message: &Message) -> SendOutcome {
        let name = channel.name().to_string();
        let message = message.clone();
        let message_id = message.id;

        match tokio::spawn(async move { channel.send(&message).await }).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(%message_id, channel = %name, error = %err, "channel send aborted");
                SendOutcome::failed(format!("{name} send aborted: {err}"))
            }
        }
    }
}
