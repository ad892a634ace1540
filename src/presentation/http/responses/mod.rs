use std::collections::HashMap;

use poem_openapi::Object;
use uuid::Uuid;

use crate::presentation::models::{MessageStatusDto, PriorityKind};

#[derive(Object)]
pub struct SendMessageResponseDto {
    pub message_id: Uuid,
    pub status: MessageStatusDto,
    pub queue_position: u32,
}

#[derive(Object)]
pub struct MessageDto {
    pub id: Uuid,
    pub recipient: String,
    pub payload: String,
    pub priority: PriorityKind,
    pub preferred_channel: Option<String>,
    pub status: MessageStatusDto,
    pub attempts: u32,
    pub max_attempts: u32,
    pub method: Option<String>,
    pub channel_message_id: Option<String>,
    pub last_error: Option<String>,
    pub created_at: String,
    pub sent_at: Option<String>,
}

#[derive(Object)]
pub struct StatsDto {
    pub sent: u64,
    pub failed: u64,
    pub queued: u64,
    pub retried: u64,
}

#[derive(Object)]
pub struct DeliveryStatusDto {
    pub adapters_available: HashMap<String, bool>,
    pub stats: StatsDto,
    pub queue_length: u32,
    pub processing: bool,
}

#[derive(Object)]
pub struct AuditEntryDto {
    pub message: MessageDto,
    pub logged_at: String,
}
