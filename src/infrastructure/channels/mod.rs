use std::{sync::Arc, time::Duration};

use anyhow::Context;
use reqwest::Client;

use crate::{application::services::channel::ChannelAdapter, config::ChannelSettings};

pub mod mock;
pub mod relay;
pub mod twilio;
pub mod whatsapp;

pub use mock::{MOCK_CHANNEL, MockChannel};
pub use relay::{LocalRelayChannel, RELAY_CHANNEL};
pub use twilio::{TWILIO_CHANNEL, TwilioChannel};
pub use whatsapp::{WHATSAPP_CHANNEL, WhatsAppCloudChannel};

pub(crate) fn build_http_client(user_agent: &str, timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .with_context(|| format!("failed to build http client for {user_agent}"))
}

/// All channels in delivery priority order: primary vendor, secondary vendor,
/// local relay, mock.
pub fn build_channels(settings: &ChannelSettings) -> anyhow::Result<Vec<Arc<dyn ChannelAdapter>>> {
    Ok(vec![
        Arc::new(WhatsAppCloudChannel::new(&settings.whatsapp)?) as Arc<dyn ChannelAdapter>,
        Arc::new(TwilioChannel::new(&settings.twilio)?),
        Arc::new(LocalRelayChannel::new(settings.relay_url.as_deref())?),
        Arc::new(MockChannel::new(settings.test_mode)),
    ])
}
