use std::sync::Arc;

use poem_openapi::{OpenApi, payload::Json};

use crate::presentation::http::{
    endpoints::root::{ApiState, EndpointsTags},
    mappers::map_status,
    responses::DeliveryStatusDto,
};

#[derive(Clone)]
pub struct StatusEndpoints {
    state: Arc<ApiState>,
}

impl StatusEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl StatusEndpoints {
    /// Channel availability, counters and queue state.
    #[oai(path = "/status", method = "get", tag = EndpointsTags::Status)]
    pub async fn status(&self) -> Json<DeliveryStatusDto> {
        let status = self.state.get_status.execute().await;
        Json(map_status(&status))
    }
}
