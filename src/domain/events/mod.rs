use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::{Message, MessageStatus};

/// Terminal outcome of a message, as written to the audit log and broadcast
/// to completion subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageFinalizedEvent {
    #[serde(flatten)]
    pub message: Message,
    pub logged_at: DateTime<Utc>,
}

impl MessageFinalizedEvent {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            logged_at: Utc::now(),
        }
    }

    pub fn status(&self) -> MessageStatus {
        self.message.status
    }
}
