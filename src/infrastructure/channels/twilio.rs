use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    application::services::channel::ChannelAdapter,
    config::TwilioSettings,
    domain::models::{Message, Payload, SendOutcome},
    infrastructure::channels::build_http_client,
};

pub const TWILIO_CHANNEL: &str = "twilio";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Secondary vendor: Twilio's WhatsApp messaging endpoint.
pub struct TwilioChannel {
    http: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

struct Credentials {
    account_sid: String,
    auth_token: String,
    from: String,
}

impl TwilioChannel {
    pub fn new(settings: &TwilioSettings) -> anyhow::Result<Self> {
        let credentials = match (
            &settings.account_sid,
            &settings.auth_token,
            &settings.whatsapp_from,
        ) {
            (Some(account_sid), Some(auth_token), Some(from)) => Some(Credentials {
                account_sid: account_sid.clone(),
                auth_token: auth_token.clone(),
                from: from.trim_start_matches('+').to_string(),
            }),
            _ => None,
        };

        Ok(Self {
            http: build_http_client("courier/twilio", REQUEST_TIMEOUT)?,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn build_form(credentials: &Credentials, message: &Message) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("From", format!("whatsapp:+{}", credentials.from)),
            ("To", format!("whatsapp:+{}", message.recipient)),
        ];
        match &message.payload {
            Payload::Text { body } => form.push(("Body", body.clone())),
            Payload::Template {
                name, parameters, ..
            } => {
                // content variables are keyed "1", "2", ... in template order
                let variables: serde_json::Map<String, serde_json::Value> = parameters
                    .iter()
                    .enumerate()
                    .map(|(index, value)| {
                        ((index + 1).to_string(), serde_json::Value::String(value.clone()))
                    })
                    .collect();
                form.push(("ContentSid", name.clone()));
                form.push((
                    "ContentVariables",
                    serde_json::Value::Object(variables).to_string(),
                ));
            }
            Payload::Image { url, caption } => {
                form.push(("MediaUrl", url.clone()));
                if let Some(caption) = caption {
                    form.push(("Body", caption.clone()));
                }
            }
        }
        form
    }

    async fn post_message(
        &self,
        credentials: &Credentials,
        message: &Message,
    ) -> anyhow::Result<Option<String>> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, credentials.account_sid
        );
        debug!(message_id = %message.id, "posting to twilio");

        let response = self
            .http
            .post(url)
            .basic_auth(&credentials.account_sid, Some(&credentials.auth_token))
            .form(&Self::build_form(credentials, message))
            .send()
            .await
            .context("twilio request failed")?;

        let status = response.status();
        let payload: TwilioResponse = response
            .json()
            .await
            .context("twilio returned an unreadable response")?;

        if !status.is_success() {
            anyhow::bail!(
                "twilio api error {}: {}",
                payload.code.unwrap_or_default(),
                payload
                    .message
                    .unwrap_or_else(|| format!("HTTP {status}"))
            );
        }

        Ok(payload.sid)
    }
}

#[async_trait]
impl ChannelAdapter for TwilioChannel {
    fn name(&self) -> &str {
        TWILIO_CHANNEL
    }

    fn is_available(&self) -> bool {
        self.credentials.is_some()
    }

    async fn send(&self, message: &Message) -> SendOutcome {
        let Some(credentials) = &self.credentials else {
            return SendOutcome::failed("twilio credentials are not configured");
        };
        SendOutcome::from_result(self.post_message(credentials, message).await)
    }
}

#[derive(Debug, Deserialize)]
struct TwilioResponse {
    sid: Option<String>,
    code: Option<i64>,
    message: Option<String>,
}
