use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::adaptor::ReadOutcome;

/// Wrapper for API responses that automatically adds success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
        }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
        }
    }

    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }

    /// 204 No Content (data will be ignored)
    pub fn no_content() -> ApiResponse<()> {
        ApiResponse::with_status((), StatusCode::NO_CONTENT)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Failed to serialize response data"
                    })),
                )
                    .into_response();
            }
        };

        let envelope = json!({
            "success": true,
            "data": data_value
        });

        (status, Json(envelope)).into_response()
    }
}

/// Grid read envelope: `data` is `null` when the read was skipped as busy,
/// and `degraded` marks a failure-policy answer.
#[derive(Debug)]
pub struct GridResponse(pub ReadOutcome<Value>);

impl IntoResponse for GridResponse {
    fn into_response(self) -> Response {
        let body = match self.0 {
            ReadOutcome::Busy => json!({
                "success": true,
                "data": null,
                "busy": true,
                "degraded": false
            }),
            ReadOutcome::Ready(result) => json!({
                "success": true,
                "data": result,
                "busy": false,
                "degraded": false
            }),
            ReadOutcome::Degraded { result, error } => json!({
                "success": true,
                "data": result,
                "busy": false,
                "degraded": true,
                "error_code": error.error_code()
            }),
        };
        (StatusCode::OK, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
