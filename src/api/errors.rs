// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    InvalidRequest(String),
    ValidationError { field: String, message: String },
    UnrollFailed(String),
}

impl ApiError {
    pub fn to_response(&self, request_id: Option<String>) -> ErrorResponse {
        let (error_type, message) = match self {
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone()),
            ApiError::ValidationError { field, message } => (
                "validation_error",
                format!("{}: {}", field, message),
            ),
            ApiError::UnrollFailed(msg) => ("unroll_failed", msg.clone()),
        };

        ErrorResponse {
            error_type: error_type.to_string(),
            message,
            request_id,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) | ApiError::ValidationError { .. } => 400,
            ApiError::UnrollFailed(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::UnrollFailed(msg) => write!(f, "Unroll failed: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::InvalidRequest("x".to_string()).status_code(), 400);
        assert_eq!(
            ApiError::ValidationError {
                field: "id".to_string(),
                message: "missing".to_string()
            }
            .status_code(),
            400
        );
        assert_eq!(ApiError::UnrollFailed("x".to_string()).status_code(), 500);
    }

    #[test]
    fn test_to_response_carries_request_id() {
        let response = ApiError::UnrollFailed("backend down".to_string())
            .to_response(Some("tid_abc".to_string()));

        assert_eq!(response.error_type, "unroll_failed");
        assert_eq!(response.message, "backend down");
        assert_eq!(response.request_id.as_deref(), Some("tid_abc"));
    }

    #[test]
    fn test_validation_error_names_the_field() {
        let response = ApiError::ValidationError {
            field: "id".to_string(),
            message: "must carry a valid identity".to_string(),
        }
        .to_response(None);

        assert!(response.message.starts_with("id:"));
    }
}
