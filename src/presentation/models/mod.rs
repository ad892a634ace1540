use poem_openapi::Enum;

use crate::domain::models::{MessageStatus, Priority};

#[derive(Enum, Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum PriorityKind {
    #[default]
    #[oai(rename = "normal")]
    Normal,
    #[oai(rename = "high")]
    High,
}

impl From<PriorityKind> for Priority {
    fn from(value: PriorityKind) -> Self {
        match value {
            PriorityKind::Normal => Priority::Normal,
            PriorityKind::High => Priority::High,
        }
    }
}

impl From<Priority> for PriorityKind {
    fn from(value: Priority) -> Self {
        match value {
            Priority::Normal => PriorityKind::Normal,
            Priority::High => PriorityKind::High,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum MessageStatusDto {
    #[oai(rename = "queued")]
    Queued,
    #[oai(rename = "sending")]
    Sending,
    #[oai(rename = "sent")]
    Sent,
    #[oai(rename = "failed")]
    Failed,
}

impl From<MessageStatus> for MessageStatusDto {
    fn from(value: MessageStatus) -> Self {
        match value {
            MessageStatus::Queued => MessageStatusDto::Queued,
            MessageStatus::Sending => MessageStatusDto::Sending,
            MessageStatus::Sent => MessageStatusDto::Sent,
            MessageStatus::Failed => MessageStatusDto::Failed,
        }
    }
}
