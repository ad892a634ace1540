use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    application::services::channel::ChannelAdapter,
    domain::models::{Message, Payload, SendOutcome},
    infrastructure::channels::build_http_client,
};

pub const RELAY_CHANNEL: &str = "relay";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Local HTTP bridge (e.g. a WhatsApp Web session) reachable at `RELAY_URL`.
pub struct LocalRelayChannel {
    http: Client,
    base_url: Option<String>,
}

impl LocalRelayChannel {
    pub fn new(base_url: Option<&str>) -> anyhow::Result<Self> {
        Ok(Self {
            http: build_http_client("courier/relay", REQUEST_TIMEOUT)?,
            base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
        })
    }

    async fn relay(&self, base_url: &str, message: &Message) -> anyhow::Result<Option<String>> {
        let request = RelayRequest {
            message_id: message.id,
            to: message.recipient.as_str(),
            payload: &message.payload,
        };

        let response = self
            .http
            .post(format!("{base_url}/send"))
            .json(&request)
            .send()
            .await
            .context("relay request failed")?;

        let status = response.status();
        let body: RelayResponse = response
            .json()
            .await
            .context("relay returned an unreadable response")?;

        if !status.is_success() || !body.success {
            anyhow::bail!(
                "relay rejected message: {}",
                body.error.unwrap_or_else(|| format!("HTTP {status}"))
            );
        }

        Ok(body.id)
    }
}

#[async_trait]
impl ChannelAdapter for LocalRelayChannel {
    fn name(&self) -> &str {
        RELAY_CHANNEL
    }

    fn is_available(&self) -> bool {
        self.base_url.is_some()
    }

    async fn send(&self, message: &Message) -> SendOutcome {
        let Some(base_url) = &self.base_url else {
            return SendOutcome::failed("relay url is not configured");
        };
        SendOutcome::from_result(self.relay(base_url, message).await)
    }
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    message_id: Uuid,
    to: &'a str,
    payload: &'a Payload,
}

#[derive(Deserialize)]
struct RelayResponse {
    #[serde(default)]
    success: bool,
    id: Option<String>,
    error: Option<String>,
}
