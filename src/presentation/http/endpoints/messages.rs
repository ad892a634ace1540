use std::sync::Arc;

use poem::Result as PoemResult;
use poem_openapi::{OpenApi, param::Path, payload::Json};
use uuid::Uuid;

use crate::{
    application::usecases::submit_message::SubmitMessageRequest,
    presentation::http::{
        endpoints::root::{ApiState, EndpointsTags, api_error},
        mappers::{map_message, map_options, map_payload},
        requests::SendMessageRequestDto,
        responses::{MessageDto, SendMessageResponseDto},
    },
};

#[derive(Clone)]
pub struct MessagesEndpoints {
    state: Arc<ApiState>,
}

impl MessagesEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl MessagesEndpoints {
    /// Queues a message for delivery and returns immediately.
    #[oai(path = "/messages", method = "post", tag = EndpointsTags::Messages)]
    pub async fn send_message(
        &self,
        request: Json<SendMessageRequestDto>,
    ) -> PoemResult<Json<SendMessageResponseDto>> {
        let payload = map_payload(&request).map_err(|err| api_error(err.into()))?;
        let submission = SubmitMessageRequest {
            recipient: request.recipient.clone(),
            payload,
            options: map_options(&request),
        };

        let response = self
            .state
            .submit_message
            .execute(submission)
            .await
            .map_err(api_error)?;

        Ok(Json(SendMessageResponseDto {
            message_id: response.message_id,
            status: response.status.into(),
            queue_position: u32::try_from(response.queue_position).unwrap_or(u32::MAX),
        }))
    }

    #[oai(path = "/messages/:message_id", method = "get", tag = EndpointsTags::Messages)]
    pub async fn get_message(&self, message_id: Path<Uuid>) -> PoemResult<Json<MessageDto>> {
        let message = self
            .state
            .get_message
            .execute(message_id.0)
            .await
            .map_err(api_error)?;

        Ok(Json(map_message(&message)))
    }
}
