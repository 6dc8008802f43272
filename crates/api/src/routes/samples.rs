//! Sample Routes

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use simtemp_device::{ReadMode, Sample};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::ApiError;
use crate::AppState;

/// Query parameters for sample reads
#[derive(Debug, Default, Deserialize)]
pub struct ReadQuery {
    /// Fail instead of waiting on an empty buffer
    #[serde(default)]
    pub nonblock: bool,
    /// Interrupt a blocking read after this many milliseconds
    pub timeout_ms: Option<u64>,
}

impl ReadQuery {
    fn mode(&self) -> ReadMode {
        ReadMode::from_nonblocking(self.nonblock)
    }
}

/// One sample as JSON
#[derive(Debug, Serialize)]
pub struct SampleView {
    pub timestamp_ns: u64,
    pub temp_mc: i32,
    pub temperature_c: f64,
    pub flags: u32,
    pub threshold_crossed: bool,
}

impl From<Sample> for SampleView {
    fn from(sample: Sample) -> Self {
        Self {
            timestamp_ns: sample.timestamp_ns,
            temp_mc: sample.temp_mc,
            temperature_c: sample.temperature_celsius(),
            flags: sample.flags,
            threshold_crossed: sample.threshold_crossed(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReadyQuery {
    /// Wait for readiness instead of reporting it immediately
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
}

/// Read one sample
pub async fn read(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReadQuery>,
) -> Result<Json<SampleView>, ApiError> {
    let sample = match params.timeout_ms {
        Some(ms) => {
            state
                .device
                .read_until(params.mode(), tokio::time::sleep(Duration::from_millis(ms)))
                .await?
        }
        None => state.device.read(params.mode()).await?,
    };
    debug!("Served sample ts={} ns", sample.timestamp_ns);
    Ok(Json(sample.into()))
}

/// Read one raw 16-byte sample record through a byte-stream session
pub async fn read_raw(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReadQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.device.open(params.nonblock)?;
    let mut record = vec![0u8; Sample::SIZE_BYTES];
    let written = match params.timeout_ms {
        Some(ms) => {
            session
                .read_until(&mut record, tokio::time::sleep(Duration::from_millis(ms)))
                .await?
        }
        None => session.read(&mut record).await?,
    };
    record.truncate(written);
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], record))
}

/// Readiness poll
pub async fn ready(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReadyQuery>,
) -> Json<ReadyResponse> {
    let readiness = if params.wait {
        state.device.readable().await
    } else {
        state.device.poll_readiness()
    };
    Json(ReadyResponse {
        ready: readiness.is_ready(),
    })
}
