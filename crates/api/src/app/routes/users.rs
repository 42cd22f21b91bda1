//! The `users` resource.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use forgekit_core::ErrorCode;
use forgekit_db::UserPatch;
use forgekit_queue::QueueOptions;

use crate::app::{dto, errors};
use crate::context::AppContext;
use crate::tasks::SendEmailPayload;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/email", post(queue_email))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

pub async fn list_users(Extension(context): Extension<Arc<AppContext>>) -> Response {
    errors::api_try(
        async {
            let users = context.users.find_all().await?;
            tracing::info!(count = users.len(), "users listed");
            Ok(errors::api_success(users, None))
        },
        "Failed to list users",
        None,
    )
    .await
}

pub async fn get_user(
    Extension(context): Extension<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Response {
    errors::api_try(
        async {
            let Some(user) = context.users.find_by_id(&id).await? else {
                tracing::warn!(user_id = %id, "user not found");
                return Ok(errors::api_error(ErrorCode::NotFound, "User not found"));
            };
            tracing::info!(user_id = %user.id, "user retrieved");
            Ok(errors::api_success(user, None))
        },
        "Failed to get user",
        None,
    )
    .await
}

pub async fn create_user(
    Extension(context): Extension<Arc<AppContext>>,
    payload: Result<Json<dto::CreateUserRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(json) => json,
        Err(rejection) => return errors::json_rejection(rejection),
    };
    if let Err(reason) = dto::validate_new_user(&body) {
        return errors::api_error(ErrorCode::ValidationError, reason);
    }

    errors::api_try(
        async {
            let user = context.users.insert(&body.name, &body.email).await?;
            tracing::info!(user_id = %user.id, "user created");
            Ok(errors::api_success(user, Some("User created successfully")))
        },
        "Failed to create user",
        Some(errors::classify_unique_violation),
    )
    .await
}

pub async fn update_user(
    Extension(context): Extension<Arc<AppContext>>,
    Path(id): Path<String>,
    payload: Result<Json<dto::UpdateUserRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(json) => json,
        Err(rejection) => return errors::json_rejection(rejection),
    };
    if let Err(reason) = dto::validate_user_patch(&body) {
        return errors::api_error(ErrorCode::ValidationError, reason);
    }

    errors::api_try(
        async {
            if context.users.find_by_id(&id).await?.is_none() {
                tracing::warn!(user_id = %id, "user not found for update");
                return Ok(errors::api_error(ErrorCode::NotFound, "User not found"));
            }

            let patch = UserPatch {
                name: body.name,
                email: body.email,
            };
            // The row can vanish between the check and the write; treat
            // that the same as failing the check.
            let Some(user) = context.users.update(&id, patch).await? else {
                tracing::warn!(user_id = %id, "user not found for update");
                return Ok(errors::api_error(ErrorCode::NotFound, "User not found"));
            };
            tracing::info!(user_id = %user.id, "user updated");
            Ok(errors::api_success(user, Some("User updated successfully")))
        },
        "Failed to update user",
        Some(errors::classify_unique_violation),
    )
    .await
}

pub async fn delete_user(
    Extension(context): Extension<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Response {
    errors::api_try(
        async {
            if context.users.find_by_id(&id).await?.is_none() {
                tracing::warn!(user_id = %id, "user not found for deletion");
                return Ok(errors::api_error(ErrorCode::NotFound, "User not found"));
            }

            context.users.delete(&id).await?;
            tracing::info!(user_id = %id, "user deleted");
            Ok(errors::api_success(
                json!({ "id": id }),
                Some("User deleted successfully"),
            ))
        },
        "Failed to delete user",
        None,
    )
    .await
}

/// Queue a welcome email to an arbitrary address.
pub async fn queue_email(
    Extension(context): Extension<Arc<AppContext>>,
    payload: Result<Json<dto::EmailRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(json) => json,
        Err(rejection) => return errors::json_rejection(rejection),
    };
    if let Err(reason) = dto::validate_email(&body.email) {
        return errors::api_error(ErrorCode::ValidationError, reason);
    }

    errors::api_try(
        async {
            let Some(queues) = context.queues.as_ref() else {
                anyhow::bail!("job queue is not configured");
            };
            tracing::info!(email = %body.email, "queuing email notification");

            let app_name = &context.config.app_name;
            let payload = SendEmailPayload {
                to: body.email.clone(),
                subject: format!("Welcome To {app_name}"),
                html: forgekit_email::welcome_html(None, app_name),
                user_id: None,
            };
            let job = queues.email.enqueue(&payload, &QueueOptions::default()).await?;

            tracing::info!(job_id = %job.id, email = %body.email, "email queued");
            Ok(errors::api_success(
                json!({ "email": body.email }),
                Some("Email queued successfully"),
            ))
        },
        "Failed to queue email",
        None,
    )
    .await
}
