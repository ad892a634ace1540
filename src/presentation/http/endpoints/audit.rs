use std::sync::Arc;

use poem::Result as PoemResult;
use poem_openapi::{OpenApi, param::Path, payload::Json};

use crate::presentation::http::{
    endpoints::root::{ApiState, EndpointsTags, api_error},
    mappers::map_audit_entry,
    responses::AuditEntryDto,
};

#[derive(Clone)]
pub struct AuditEndpoints {
    state: Arc<ApiState>,
}

impl AuditEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl AuditEndpoints {
    /// Terminal outcomes logged on a UTC day (`YYYY-MM-DD`).
    #[oai(path = "/audit/:date", method = "get", tag = EndpointsTags::Audit)]
    pub async fn audit_day(&self, date: Path<String>) -> PoemResult<Json<Vec<AuditEntryDto>>> {
        let entries = self
            .state
            .read_audit_log
            .execute(&date.0)
            .await
            .map_err(api_error)?;

        Ok(Json(entries.iter().map(map_audit_entry).collect()))
    }
}
