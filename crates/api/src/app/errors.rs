//! Envelope responses and the handler error policy.

use std::future::Future;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use forgekit_core::{ErrorBody, ErrorCode, SuccessBody};
use forgekit_db::DbError;

/// 200 with the success envelope.
pub fn api_success<T: Serialize>(data: T, message: Option<&str>) -> Response {
    let body = match message {
        Some(message) => SuccessBody::with_message(data, message),
        None => SuccessBody::new(data),
    };
    Json(body).into_response()
}

/// Error envelope with the status implied by the code.
pub fn api_error(code: ErrorCode, message: impl Into<String>) -> Response {
    (status_for(code), Json(ErrorBody::new(code, message))).into_response()
}

pub fn api_error_with_details(
    code: ErrorCode,
    message: impl Into<String>,
    details: serde_json::Value,
) -> Response {
    (
        status_for(code),
        Json(ErrorBody::with_details(code, message, details)),
    )
        .into_response()
}

fn status_for(code: ErrorCode) -> StatusCode {
    StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Run a handler body, translating an `Err` into the error envelope.
///
/// A classifier may claim the error first (e.g. turn a unique violation
/// into a validation response); anything unclaimed becomes INTERNAL_ERROR
/// with `fallback_message` and the raw error string as `details`.
pub async fn api_try<F>(
    future: F,
    fallback_message: &str,
    classify: Option<fn(&anyhow::Error) -> Option<Response>>,
) -> Response
where
    F: Future<Output = anyhow::Result<Response>>,
{
    match future.await {
        Ok(response) => response,
        Err(err) => {
            if let Some(classify) = classify {
                if let Some(response) = classify(&err) {
                    return response;
                }
            }
            api_error_with_details(
                ErrorCode::InternalError,
                fallback_message,
                json!(err.to_string()),
            )
        }
    }
}

/// Duplicate-key writes are a caller mistake, not a server fault.
pub fn classify_unique_violation(err: &anyhow::Error) -> Option<Response> {
    match err.downcast_ref::<DbError>() {
        Some(db_err) if db_err.is_unique_violation() => {
            Some(api_error(ErrorCode::ValidationError, "Email already exists"))
        }
        _ => None,
    }
}

/// Body extraction failures, before the handler ever runs.
///
/// A payload that fails the schema (missing field, wrong type) is a 422
/// like any other validation failure; a body that is not JSON at all, or
/// the wrong content type, is a 400.
pub fn json_rejection(rejection: JsonRejection) -> Response {
    match rejection {
        JsonRejection::JsonDataError(err) => api_error(ErrorCode::ValidationError, err.body_text()),
        JsonRejection::JsonSyntaxError(err) => api_error(ErrorCode::BadRequest, err.body_text()),
        other => api_error(ErrorCode::BadRequest, other.body_text()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_statuses_follow_the_code() {
        assert_eq!(
            api_error(ErrorCode::ValidationError, "bad").status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            api_error(ErrorCode::NotFound, "gone").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            api_error(ErrorCode::BadRequest, "nope").status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn success_is_always_200() {
        assert_eq!(api_success(json!({}), None).status(), StatusCode::OK);
        assert_eq!(
            api_success(json!({}), Some("User created successfully")).status(),
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn api_try_passes_ok_responses_through() {
        let response = api_try(
            async { Ok(api_success(json!({ "id": "u1" }), None)) },
            "Failed",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_try_falls_back_to_internal_error() {
        let response = api_try(
            async { Err(anyhow::anyhow!("connection refused")) },
            "Failed to list users",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], "Failed to list users");
        assert_eq!(body["error"]["details"], "connection refused");
    }

    #[tokio::test]
    async fn classifier_takes_precedence() {
        let err = anyhow::Error::from(DbError::UniqueViolation {
            constraint: "users_email_key".to_string(),
        });
        let response = api_try(
            async { Err(err) },
            "Failed to create user",
            Some(classify_unique_violation),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["message"], "Email already exists");
    }

    #[test]
    fn classifier_ignores_unrelated_errors() {
        let err = anyhow::anyhow!("something else");
        assert!(classify_unique_violation(&err).is_none());
    }
}
