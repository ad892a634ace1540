use crate::{
    application::usecases::get_status::DeliveryStatus,
    domain::{
        errors::DomainError,
        events::MessageFinalizedEvent,
        models::{DeliveryOptions, Message, Payload},
    },
    presentation::http::{
        requests::SendMessageRequestDto,
        responses::{AuditEntryDto, DeliveryStatusDto, MessageDto, StatsDto},
    },
};

pub fn map_payload(request: &SendMessageRequestDto) -> Result<Payload, DomainError> {
    match (&request.text, &request.template, &request.image) {
        (Some(text), None, None) => Ok(Payload::Text { body: text.clone() }),
        (None, Some(template), None) => Ok(Payload::Template {
            name: template.name.clone(),
            language: template.language.clone(),
            parameters: template.parameters.clone(),
        }),
        (None, None, Some(image)) => Ok(Payload::Image {
            url: image.url.clone(),
            caption: image.caption.clone(),
        }),
        _ => Err(DomainError::Validation(
            "exactly one of text, template or image is required".to_string(),
        )),
    }
}

pub fn map_options(request: &SendMessageRequestDto) -> DeliveryOptions {
    DeliveryOptions {
        priority: request.priority.into(),
        preferred_channel: request.preferred_channel.clone(),
    }
}

pub fn map_message(message: &Message) -> MessageDto {
    MessageDto {
        id: message.id,
        recipient: message.recipient.to_string(),
        payload: message.payload.summary(),
        priority: message.options.priority.into(),
        preferred_channel: message.options.preferred_channel.clone(),
        status: message.status.into(),
        attempts: message.attempts,
        max_attempts: message.max_attempts,
        method: message.method.clone(),
        channel_message_id: message.channel_message_id.clone(),
        last_error: message.last_error.clone(),
        created_at: message.created_at.to_rfc3339(),
        sent_at: message.sent_at.map(|at| at.to_rfc3339()),
    }
}

pub fn map_status(status: &DeliveryStatus) -> DeliveryStatusDto {
    DeliveryStatusDto {
        adapters_available: status
            .channels
            .iter()
            .map(|channel| (channel.name.clone(), channel.available))
            .collect(),
        stats: StatsDto {
            sent: status.stats.sent,
            failed: status.stats.failed,
            queued: status.stats.queued,
            retried: status.stats.retried,
        },
        queue_length: u32::try_from(status.queue_length).unwrap_or(u32::MAX),
        processing: status.processing,
    }
}

pub fn map_audit_entry(entry: &MessageFinalizedEvent) -> AuditEntryDto {
    AuditEntryDto {
        message: map_message(&entry.message),
        logged_at: entry.logged_at.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::{
        http::requests::{ImagePayloadDto, TemplatePayloadDto},
        models::PriorityKind,
    };

    fn request() -> SendMessageRequestDto {
        SendMessageRequestDto {
            recipient: "9876543210".to_string(),
            text: None,
            template: None,
            image: None,
            priority: PriorityKind::default(),
            preferred_channel: None,
        }
    }

    #[test]
    fn maps_the_single_payload_kind() {
        let text = SendMessageRequestDto {
            text: Some("Hello".to_string()),
            ..request()
        };
        assert_eq!(
            map_payload(&text).unwrap(),
            Payload::Text {
                body: "Hello".to_string()
            }
        );

        let template = SendMessageRequestDto {
            template: Some(TemplatePayloadDto {
                name: "welcome".to_string(),
                language: "en".to_string(),
                parameters: vec!["Asha".to_string()],
            }),
            ..request()
        };
        assert!(matches!(
            map_payload(&template).unwrap(),
            Payload::Template { name, .. } if name == "welcome"
        ));
    }

    #[test]
    fn rejects_missing_or_ambiguous_payloads() {
        assert!(matches!(
            map_payload(&request()),
            Err(DomainError::Validation(_))
        ));

        let both = SendMessageRequestDto {
            text: Some("Hello".to_string()),
            image: Some(ImagePayloadDto {
                url: "https://example.com/a.png".to_string(),
                caption: None,
            }),
            ..request()
        };
        assert!(matches!(map_payload(&both), Err(DomainError::Validation(_))));
    }

    #[test]
    fn high_priority_and_preferred_channel_carry_over() {
        let options = map_options(&SendMessageRequestDto {
            priority: PriorityKind::High,
            preferred_channel: Some("relay".to_string()),
            ..request()
        });
        assert_eq!(options.priority, crate::domain::models::Priority::High);
        assert_eq!(options.preferred_channel.as_deref(), Some("relay"));
    }
}
