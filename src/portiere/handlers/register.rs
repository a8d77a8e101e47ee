//! Registration flow: validate, check uniqueness, hash, persist.

use crate::{
    directory::DynAccountStore,
    hasher,
    portiere::handlers::{valid_email, valid_password, valid_username},
};
use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    pub registered: bool,
    pub username: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registration successful", body = RegisterResponse),
        (status = 409, description = "Account with that username or email already exists"),
        (status = 422, description = "A field failed validation"),
        (status = 503, description = "Account store rejected the write"),
    ),
    tag = "auth"
)]
#[instrument(skip(store, payload))]
pub async fn register(
    store: Extension<DynAccountStore>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::UNPROCESSABLE_ENTITY, "Missing payload").into_response();
    };

    let email = request.email.trim().to_lowercase();

    if !valid_username(&request.username) {
        return (StatusCode::UNPROCESSABLE_ENTITY, "Invalid username").into_response();
    }

    if !valid_email(&email) {
        return (StatusCode::UNPROCESSABLE_ENTITY, "Invalid email").into_response();
    }

    if !valid_password(&request.password) {
        return (StatusCode::UNPROCESSABLE_ENTITY, "Invalid password").into_response();
    }

    // Check both unique fields independently; the username wins the
    // tie-break when both collide.
    let username_taken = match store.exists(&request.username).await {
        Ok(taken) => taken,
        Err(err) => {
            error!("Error checking username existence: {:?}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error checking if account exists",
            )
                .into_response();
        }
    };

    let email_taken = match store.exists(&email).await {
        Ok(taken) => taken,
        Err(err) => {
            error!("Error checking email existence: {:?}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error checking if account exists",
            )
                .into_response();
        }
    };

    if username_taken {
        return (
            StatusCode::CONFLICT,
            "Account with that username already exists",
        )
            .into_response();
    }

    if email_taken {
        return (
            StatusCode::CONFLICT,
            "Account with that email already exists",
        )
            .into_response();
    }

    let password_hash = match hasher::hash(&request.password) {
        Ok(hash) => hash,
        Err(err) => {
            error!("Error hashing password: {:?}", err);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error hashing password").into_response();
        }
    };

    // The existence pre-check is best-effort; a concurrent registration
    // can still win the race, in which case the store rejects the write.
    match store
        .insert(&request.username, &email, &password_hash)
        .await
    {
        Ok(account) => (
            StatusCode::OK,
            Json(RegisterResponse {
                registered: true,
                username: account.username,
            }),
        )
            .into_response(),
        Err(err) => {
            error!("Error inserting account: {:?}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Account creation failed, try again later",
            )
                .into_response()
        }
    }
}
