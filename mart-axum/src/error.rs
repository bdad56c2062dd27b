use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mart_core::errors::MartError;

#[derive(Debug)]
pub struct MartAxumError(pub anyhow::Error);

impl From<anyhow::Error> for MartAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<MartError> for MartAxumError {
    fn from(e: MartError) -> Self {
        Self(e.into_anyhow())
    }
}

impl IntoResponse for MartAxumError {
    fn into_response(self) -> Response {
        // keep the structured fields even when wrapped in anyhow context
        let safe = match MartError::find_in(&self.0) {
            Some(mart) => mart.sanitize_for_client(),
            None => MartError::general_error(self.0.to_string()),
        };

        if safe.kind.is_server_error() {
            tracing::error!(error = ?self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, "request rejected");
        }

        let status = StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(safe.to_json())).into_response()
    }
}
