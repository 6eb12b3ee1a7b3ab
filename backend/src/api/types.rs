//! REST API response types.
//!
//! The success body of `/attendance` is the [`AttendanceReport`](crate::models::AttendanceReport)
//! itself. Failures are always `{"error": "<message>"}` with a non-200 status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::AttendanceError;

/// Body returned for every failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create an error response
pub fn error_response(error: &str) -> ErrorResponse {
    ErrorResponse {
        error: error.to_string(),
    }
}

/// Service status reported by `/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub source_url: String,
}

/// Pipeline failure as seen by the HTTP layer.
#[derive(Debug)]
pub struct ApiError(pub AttendanceError);

impl ApiError {
    /// Retrieval failures map to 502, parse failures to 500.
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            AttendanceError::Retrieval(_) => StatusCode::BAD_GATEWAY,
            AttendanceError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AttendanceError> for ApiError {
    fn from(err: AttendanceError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = error_response(&self.0.to_string());
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ParseError, RetrievalError};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_retrieval_error_is_bad_gateway() {
        let err = ApiError::from(AttendanceError::from(RetrievalError::Timeout));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Retrieval error: Source request timed out");
        assert_eq!(json.as_object().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_parse_error_is_internal_error() {
        let err = ApiError::from(AttendanceError::from(ParseError::MissingColumns(vec!["Venue".into()])));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("Venue"));
    }
}
