//! API Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use simtemp_device::DeviceError;
use thiserror::Error;

/// Errors returned by HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Metrics exporter not installed")]
    MetricsUnavailable,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errno: Option<i32>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Device(e) => match e {
                DeviceError::Validation(_)
                | DeviceError::InvalidArgument(_)
                | DeviceError::Fault(_)
                | DeviceError::NotSupported(_) => StatusCode::BAD_REQUEST,
                DeviceError::UnknownAttribute(_) => StatusCode::NOT_FOUND,
                DeviceError::ReadOnly(_) => StatusCode::METHOD_NOT_ALLOWED,
                DeviceError::WouldBlock => StatusCode::SERVICE_UNAVAILABLE,
                DeviceError::Interrupted => StatusCode::REQUEST_TIMEOUT,
                DeviceError::Disabled => StatusCode::CONFLICT,
                DeviceError::Gone => StatusCode::GONE,
                DeviceError::Init(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MetricsUnavailable => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let errno = match &self {
            ApiError::Device(e) => Some(e.errno()),
            _ => None,
        };
        let body = ErrorBody {
            error: self.to_string(),
            errno,
        };
        (self.status(), Json(body)).into_response()
    }
}
