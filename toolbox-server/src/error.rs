//! Maps [`ToolboxError`] onto the REST transport's `{error: {code, message}}`
//! envelope and HTTP status (§4.8, §7).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use toolbox_core::ToolboxError;

pub struct ApiError(pub ToolboxError);

impl From<ToolboxError> for ApiError {
    fn from(err: ToolboxError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(json!({
            "error": {
                "code": self.0.error_code(),
                "message": self.0.to_string(),
            }
        }));
        (status, body).into_response()
    }
}
