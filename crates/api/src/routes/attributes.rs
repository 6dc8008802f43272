//! Attribute Routes

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use simtemp_device::Attribute;
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

/// Show one attribute as plain text
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let attr: Attribute = name.parse()?;
    let text = state.device.show_attribute(attr)?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

/// Store one attribute from a plain-text body
pub async fn store(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: String,
) -> Result<StatusCode, ApiError> {
    let attr: Attribute = name.parse()?;
    state.device.store_attribute(attr, &body).await?;
    info!("Attribute {} updated over HTTP", attr);
    Ok(StatusCode::NO_CONTENT)
}
