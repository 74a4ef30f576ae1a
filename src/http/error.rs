use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::ReportError;

impl ReportError {
    pub fn status(&self) -> StatusCode {
        match self {
            ReportError::Validation(_) => StatusCode::BAD_REQUEST,
            ReportError::NotFound(_) => StatusCode::NOT_FOUND,
            ReportError::UpstreamRejected { .. } | ReportError::UpstreamMalformed(_) => {
                StatusCode::BAD_GATEWAY
            }
            ReportError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ReportError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Errors become `{"error": message, "code": CODE}` with the matching status.
impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ReportError::Storage(detail) => {
                tracing::error!(error = %detail, "storage error");
                "An internal storage error occurred".to_string()
            }
            other => {
                if status.is_server_error() {
                    tracing::warn!(error = %other, "upstream failure");
                }
                other.to_string()
            }
        };

        let body = json!({
            "error": message,
            "code": self.code(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ReportError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ReportError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ReportError::UpstreamRejected {
                status: 403,
                message: "x".into()
            }
            .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ReportError::UpstreamMalformed("x".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ReportError::UpstreamUnavailable("x".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ReportError::Storage("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_error_response_is_500() {
        let response = ReportError::Storage("disk I/O error at /secret/path".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
