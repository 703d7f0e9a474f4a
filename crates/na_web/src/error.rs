use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use na_core::Error;
use serde_json::json;
use tracing::error;

/// Turns a failed model call into a JSON error response.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            Error::Inference(_) | Error::Http(_) | Error::Serialization(_) => StatusCode::BAD_GATEWAY,
            Error::EmptyInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        error!("❌ Request failed ({}): {}", status, self.0);
        let body = Json(json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
        }));
        (status, body).into_response()
    }
}
