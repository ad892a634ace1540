use std::sync::Arc;

use poem::http::StatusCode;
use poem_openapi::{OpenApiService, Tags};

use crate::{
    app::DeliveryApp,
    domain::errors::DomainError,
    presentation::http::endpoints::{
        audit::AuditEndpoints, health::HealthEndpoints, messages::MessagesEndpoints,
        status::StatusEndpoints,
    },
};

pub type ApiState = DeliveryApp;

/// Enum of API sections (tags)
#[derive(Tags)]
pub enum EndpointsTags {
    Health,
    Messages,
    Status,
    Audit,
}

pub type Endpoints = (
    HealthEndpoints,
    MessagesEndpoints,
    StatusEndpoints,
    AuditEndpoints,
);

pub fn api_service(state: Arc<ApiState>, server_url: &str) -> OpenApiService<Endpoints, ()> {
    let endpoints = (
        HealthEndpoints,
        MessagesEndpoints::new(state.clone()),
        StatusEndpoints::new(state.clone()),
        AuditEndpoints::new(state),
    );
    OpenApiService::new(endpoints, "Courier API", env!("CARGO_PKG_VERSION"))
        .server(format!("{server_url}/api"))
}

pub(crate) fn api_error(err: anyhow::Error) -> poem::Error {
    let status = match err.downcast_ref::<DomainError>() {
        Some(DomainError::Validation(_)) => StatusCode::BAD_REQUEST,
        Some(DomainError::NotFound(_)) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    poem::Error::from_string(err.to_string(), status)
}
