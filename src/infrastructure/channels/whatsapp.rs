use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::{
    application::services::channel::ChannelAdapter,
    config::WhatsAppSettings,
    domain::models::{Message, Payload, SendOutcome},
    infrastructure::channels::build_http_client,
};

pub const WHATSAPP_CHANNEL: &str = "whatsapp";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Primary vendor: WhatsApp Cloud API.
pub struct WhatsAppCloudChannel {
    http: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

struct Credentials {
    access_token: String,
    phone_number_id: String,
}

impl WhatsAppCloudChannel {
    pub fn new(settings: &WhatsAppSettings) -> anyhow::Result<Self> {
        let credentials = match (&settings.access_token, &settings.phone_number_id) {
            (Some(access_token), Some(phone_number_id)) => Some(Credentials {
                access_token: access_token.clone(),
                phone_number_id: phone_number_id.clone(),
            }),
            _ => None,
        };

        Ok(Self {
            http: build_http_client("courier/whatsapp", REQUEST_TIMEOUT)?,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn build_body(message: &Message) -> Value {
        let to = message.recipient.as_str();
        match &message.payload {
            Payload::Text { body } => json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": to,
                "type": "text",
                "text": { "body": body },
            }),
            Payload::Template {
                name,
                language,
                parameters,
            } => {
                let mut template = json!({
                    "name": name,
                    "language": { "code": language },
                });
                if !parameters.is_empty() {
                    let params: Vec<Value> = parameters
                        .iter()
                        .map(|text| json!({ "type": "text", "text": text }))
                        .collect();
                    template["components"] = json!([{ "type": "body", "parameters": params }]);
                }
                json!({
                    "messaging_product": "whatsapp",
                    "recipient_type": "individual",
                    "to": to,
                    "type": "template",
                    "template": template,
                })
            }
            Payload::Image { url, caption } => {
                let mut image = json!({ "link": url });
                if let Some(caption) = caption {
                    image["caption"] = json!(caption);
                }
                json!({
                    "messaging_product": "whatsapp",
                    "recipient_type": "individual",
                    "to": to,
                    "type": "image",
                    "image": image,
                })
            }
        }
    }

    async fn post_message(
        &self,
        credentials: &Credentials,
        message: &Message,
    ) -> anyhow::Result<Option<String>> {
        let url = format!(
            "{}/{}/messages",
            self.base_url, credentials.phone_number_id
        );
        debug!(message_id = %message.id, %url, "posting to whatsapp cloud api");

        let response = self
            .http
            .post(url)
            .bearer_auth(&credentials.access_token)
            .json(&Self::build_body(message))
            .send()
            .await
            .context("whatsapp request failed")?;

        let status = response.status();
        let payload: WhatsAppResponse = response
            .json()
            .await
            .context("whatsapp returned an unreadable response")?;

        if let Some(error) = payload.error {
            anyhow::bail!(
                "whatsapp api error {}: {}",
                error.code.unwrap_or_default(),
                error.message
            );
        }
        if !status.is_success() {
            anyhow::bail!("whatsapp api returned HTTP {status}");
        }

        Ok(payload.messages.into_iter().next().map(|m| m.id))
    }
}

#[async_trait]
impl ChannelAdapter for WhatsAppCloudChannel {
    fn name(&self) -> &str {
        WHATSAPP_CHANNEL
    }

    fn is_available(&self) -> bool {
        self.credentials.is_some()
    }

    async fn send(&self, message: &Message) -> SendOutcome {
        let Some(credentials) = &self.credentials else {
            return SendOutcome::failed("whatsapp credentials are not configured");
        };
        SendOutcome::from_result(self.post_message(credentials, message).await)
    }
}

#[derive(Debug, Deserialize)]
struct WhatsAppResponse {
    #[serde(default)]
    messages: Vec<WhatsAppMessageRef>,
    error: Option<WhatsAppError>,
}

#[derive(Debug, Deserialize)]
struct WhatsAppMessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct WhatsAppError {
    message: String,
    code: Option<i64>,
}
