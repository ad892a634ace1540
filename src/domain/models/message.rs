use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{errors::DomainError, value_objects::Recipient};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    Text {
        body: String,
    },
    Template {
        name: String,
        language: String,
        #[serde(default)]
        parameters: Vec<String>,
    },
    Image {
        url: String,
        caption: Option<String>,
    },
}

impl Payload {
    pub fn validate(&self) -> Result<(), DomainError> {
        let missing = match self {
            Payload::Text { body } => body.trim().is_empty().then_some("text body"),
            Payload::Template { name, .. } => name.trim().is_empty().then_some("template name"),
            Payload::Image { url, .. } => url.trim().is_empty().then_some("image url"),
        };
        match missing {
            Some(field) => Err(DomainError::Validation(format!("{field} is empty"))),
            None => Ok(()),
        }
    }

    /// Short human-readable description used in logs and audit views.
    pub fn summary(&self) -> String {
        match self {
            Payload::Text { body } => {
                let preview: String = body.chars().take(64).collect();
                if preview.len() < body.len() {
                    format!("text: {preview}...")
                } else {
                    format!("text: {preview}")
                }
            }
            Payload::Template {
                name, parameters, ..
            } => format!("template: {name} ({} params)", parameters.len()),
            Payload::Image { url, .. } => format!("image: {url}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Normal,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOptions {
    #[serde(default)]
    pub priority: Priority,
    /// Channel to try before the registered order, if it is available.
    #[serde(default)]
    pub preferred_channel: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Queued,
    Sending,
    Sent,
    Failed,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Queued => "queued",
            MessageStatus::Sending => "sending",
            MessageStatus::Sent => "sent",
            MessageStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MessageStatus::Sent | MessageStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub recipient: Recipient,
    pub payload: Payload,
    pub options: DeliveryOptions,
    pub attempts: u32,
    pub max_attempts: u32,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub method: Option<String>,
    pub channel_message_id: Option<String>,
}

impl Message {
    pub fn new(
        recipient: Recipient,
        payload: Payload,
        options: DeliveryOptions,
        max_attempts: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient,
            payload,
            options,
            attempts: 0,
            max_attempts: max_attempts.max(1),
            status: MessageStatus::Queued,
            created_at: Utc::now(),
            sent_at: None,
            last_error: None,
            method: None,
            channel_message_id: None,
        }
    }

    pub fn begin_attempt(&mut self) -> Result<(), DomainError> {
        self.transition(MessageStatus::Queued, MessageStatus::Sending)
    }

    pub fn mark_sent(
        &mut self,
        method: String,
        channel_message_id: Option<String>,
    ) -> Result<(), DomainError> {
        self.transition(MessageStatus::Sending, MessageStatus::Sent)?;
        self.sent_at = Some(Utc::now());
        self.method = Some(method);
        self.channel_message_id = channel_message_id;
        Ok(())
    }

    /// Counts a failed attempt and returns the new attempt count.
    ///
    /// The message stays in `sending` until the caller decides between
    /// [`Message::requeue`] and [`Message::mark_failed`].
    pub fn record_failure(&mut self, error: String) -> Result<u32, DomainError> {
        if self.status != MessageStatus::Sending {
            return Err(DomainError::InvalidTransition {
                from: self.status.as_str(),
                to: "failure",
            });
        }
        self.attempts = self.attempts.saturating_add(1).min(self.max_attempts);
        self.last_error = Some(error);
        Ok(self.attempts)
    }

    pub fn requeue(&mut self) -> Result<(), DomainError> {
        if self.attempts_exhausted() {
            return Err(DomainError::InvalidTransition {
                from: self.status.as_str(),
                to: MessageStatus::Queued.as_str(),
            });
        }
        self.transition(MessageStatus::Sending, MessageStatus::Queued)
    }

    pub fn mark_failed(&mut self) -> Result<(), DomainError> {
        self.transition(MessageStatus::Sending, MessageStatus::Failed)
    }

    /// Fails a message from any non-terminal state. Terminal messages are
    /// left untouched.
    pub fn abandon(&mut self, error: String) {
        if self.status.is_terminal() {
            return;
        }
        self.status = MessageStatus::Failed;
        self.last_error = Some(error);
    }

    pub fn attempts_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    fn transition(&mut self, from: MessageStatus, to: MessageStatus) -> Result<(), DomainError> {
        if self.status != from {
            return Err(DomainError::InvalidTransition {
                from: self.status.as_str(),
                to: to.as_str(),
            });
        }
        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(max_attempts: u32) -> Message {
        Message::new(
            Recipient::parse("919876543210", "91").unwrap(),
            Payload::Text {
                body: "hello".to_string(),
            },
            DeliveryOptions::default(),
            max_attempts,
        )
    }

    #[test]
    fn terminal_states_are_final() {
        let mut msg = message(3);
        msg.begin_attempt().unwrap();
        msg.mark_sent("mock".to_string(), None).unwrap();

        assert!(msg.begin_attempt().is_err());
        assert!(msg.mark_failed().is_err());
        assert!(msg.requeue().is_err());
        assert_eq!(msg.status, MessageStatus::Sent);
    }

    #[test]
    fn attempts_never_exceed_bound() {
        let mut msg = message(2);
        msg.begin_attempt().unwrap();
        assert_eq!(msg.record_failure("boom".to_string()).unwrap(), 1);
        msg.requeue().unwrap();
        msg.begin_attempt().unwrap();
        assert_eq!(msg.record_failure("boom".to_string()).unwrap(), 2);

        assert!(msg.attempts_exhausted());
        assert!(msg.requeue().is_err());
        msg.mark_failed().unwrap();
        assert_eq!(msg.attempts, 2);
        assert_eq!(msg.last_error.as_deref(), Some("boom"));
    }

    #[test]
    fn abandon_fails_in_flight_messages_only() {
        let mut in_flight = message(3);
        in_flight.begin_attempt().unwrap();
        in_flight.abandon("store unavailable".to_string());
        assert_eq!(in_flight.status, MessageStatus::Failed);
        assert_eq!(in_flight.last_error.as_deref(), Some("store unavailable"));

        let mut delivered = message(3);
        delivered.begin_attempt().unwrap();
        delivered.mark_sent("mock".to_string(), None).unwrap();
        delivered.abandon("late error".to_string());
        assert_eq!(delivered.status, MessageStatus::Sent);
        assert!(delivered.last_error.is_none());
    }

    #[test]
    fn empty_payloads_are_rejected() {
        assert!(Payload::Text { body: " ".into() }.validate().is_err());
        assert!(
            Payload::Image {
                url: String::new(),
                caption: None
            }
            .validate()
            .is_err()
        );
        assert!(
            Payload::Template {
                name: "welcome".into(),
                language: "en".into(),
                parameters: vec![]
            }
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn long_text_summary_is_truncated() {
        let payload = Payload::Text {
            body: "x".repeat(100),
        };
        assert!(payload.summary().ends_with("..."));
    }
}
