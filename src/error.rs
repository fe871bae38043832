// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;

use crate::auth::correlation::{RequestId, REQUEST_ID_HEADER};
use crate::downstream::DownstreamError;

/// HTTP error carrying the request correlation id.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub request_id: RequestId,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    requestid: &'a str,
    message: &'a str,
    timestamp: i64,
}

impl ApiError {
    pub fn new(request_id: RequestId, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            request_id,
        }
    }

    pub fn not_found(request_id: RequestId, message: impl Into<String>) -> Self {
        Self::new(request_id, StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(request_id: RequestId, message: impl Into<String>) -> Self {
        Self::new(request_id, StatusCode::BAD_REQUEST, message)
    }

    /// Map a collaborator failure. Details stay in the logs.
    pub fn downstream(request_id: RequestId, err: DownstreamError) -> Self {
        match err {
            DownstreamError::Unimplemented { operation, .. } => Self::new(
                request_id,
                StatusCode::NOT_IMPLEMENTED,
                format!("{operation} is not supported"),
            ),
            DownstreamError::NotFound { what, .. } => {
                Self::not_found(request_id, format!("{what} not found"))
            }
            other => {
                tracing::warn!(error = %other, "downstream call failed");
                Self::new(
                    request_id,
                    StatusCode::BAD_GATEWAY,
                    "Upstream service unavailable",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            requestid: self.request_id.as_str(),
            message: &self.message,
            timestamp: Utc::now().timestamp(),
        };

        // The status is already decided; an encoding failure only loses the body.
        let mut response = match serde_json::to_vec(&body) {
            Ok(bytes) => {
                let mut response = Response::new(Body::from(bytes));
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                response
            }
            Err(e) => {
                tracing::error!(error = %e, request_id = %self.request_id, "failed to encode error body");
                Response::new(Body::empty())
            }
        };

        *response.status_mut() = self.status;
        if let Ok(value) = HeaderValue::from_str(self.request_id.as_str()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    fn request_id() -> RequestId {
        RequestId::parse("1a2b3c4d").unwrap()
    }

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found(request_id(), "missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request(request_id(), "bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.message, "bad");
    }

    #[tokio::test]
    async fn into_response_returns_structured_body() {
        let before = Utc::now().timestamp();
        let response = ApiError::bad_request(request_id(), "bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "1a2b3c4d");

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["requestid"], "1a2b3c4d");
        assert_eq!(body["message"], "bad data");
        assert!(body["timestamp"].as_i64().unwrap() >= before);
    }

    #[test]
    fn unimplemented_downstream_maps_to_501() {
        let err = DownstreamError::Unimplemented {
            service: "payment provider",
            operation: "refund",
        };
        let api = ApiError::downstream(request_id(), err);
        assert_eq!(api.status, StatusCode::NOT_IMPLEMENTED);
    }

    #[test]
    fn not_found_downstream_maps_to_404() {
        let err = DownstreamError::NotFound {
            service: "payment provider",
            what: "payment pay_1".to_string(),
        };
        let api = ApiError::downstream(request_id(), err);
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.message, "payment pay_1 not found");
    }

    #[test]
    fn other_downstream_failures_map_to_502() {
        let err = DownstreamError::UnexpectedStatus {
            service: "registration service",
            status: 500,
        };
        let api = ApiError::downstream(request_id(), err);
        assert_eq!(api.status, StatusCode::BAD_GATEWAY);
    }
}
