//! Control-Command Route

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use simtemp_protocol::ControlCommand;
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppState;

/// Parse a command code given in decimal or `0x` hex
pub fn parse_code(raw: &str) -> Result<u32, ApiError> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|_| ApiError::BadRequest(format!("invalid command code {:?}", raw)))
}

/// Execute a control command.
///
/// The request body is the input payload; the response body is the output
/// record (empty for commands without one).
pub async fn execute(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let code = parse_code(&code)?;

    let mut payload = body.to_vec();
    // Room for the output record; input payloads are checked as sent
    if let Ok(command) = ControlCommand::decode(code, &body) {
        let needed = payload.len().max(command.response_size());
        payload.resize(needed, 0);
    }

    let written = state.device.control(code, &mut payload).await?;
    payload.truncate(written);
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_code() {
        assert_eq!(parse_code("0x5305").unwrap(), 0x5305);
        assert_eq!(parse_code("21255").unwrap(), 0x5307);
        assert!(matches!(parse_code("0xZZ"), Err(ApiError::BadRequest(_))));
        assert!(parse_code("-1").is_err());
    }
}
