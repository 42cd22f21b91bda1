//! Uniform response bodies shared by success and error paths.
//!
//! Every endpoint answers with one of two shapes:
//! `{ "success": true, "data": ..., "message"? }` or
//! `{ "success": false, "error": { "code", "message", "details"? } }`.
//! Optional fields are omitted entirely, never serialized as null.

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

/// Body of a successful response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessBody<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> SuccessBody<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}

/// Body of a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: ErrorDetail,
}

/// The `error` object inside [`ErrorBody`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code,
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: ErrorCode,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code,
                message: message.into(),
                details: Some(details),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_body_omits_absent_message() {
        let body = SuccessBody::new(json!({ "id": "u1" }));
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, json!({ "success": true, "data": { "id": "u1" } }));
    }

    #[test]
    fn success_body_carries_message_when_set() {
        let body = SuccessBody::with_message(json!(null), "User deleted successfully");
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["message"], json!("User deleted successfully"));
        assert_eq!(value["success"], json!(true));
    }

    #[test]
    fn error_body_shape() {
        let body = ErrorBody::new(ErrorCode::NotFound, "User not found");
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "error": { "code": "NOT_FOUND", "message": "User not found" }
            })
        );
    }

    #[test]
    fn error_body_details_pass_through() {
        let body = ErrorBody::with_details(
            ErrorCode::InternalError,
            "Internal server error",
            json!("connection refused"),
        );
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["error"]["details"], json!("connection refused"));
    }
}
