//! Authentication flow: resolve the identifier, verify the password,
//! issue a bearer token.
//!
//! The two failure modes an attacker cares about, "no such account" and
//! "wrong password", return the same status, the same body, and burn the
//! same bcrypt cost, so neither the response nor its timing reveals
//! whether an identifier is registered.

use crate::{
    directory::{DUMMY_PASSWORD_HASH, DynAccountStore},
    hasher,
    token::{DEFAULT_TTL, TokenCodec},
};
use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response()
}

#[utoipa::path(
    post,
    path = "/api/auth/token",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authentication successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "A field failed validation"),
    ),
    tag = "auth"
)]
#[instrument(skip(codec, store, payload))]
pub async fn login(
    codec: Extension<Arc<TokenCodec>>,
    store: Extension<DynAccountStore>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::UNPROCESSABLE_ENTITY, "Missing payload").into_response();
    };

    // Either unique field identifies the account; an explicit username
    // takes priority when both are present.
    let Some(identifier) = request.username.as_deref().or(request.email.as_deref()) else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Username or email must be provided",
        )
            .into_response();
    };

    if request.password.chars().count() < 8 {
        return (StatusCode::UNPROCESSABLE_ENTITY, "Invalid password").into_response();
    }

    let account = match store.find_by_identifier(identifier).await {
        Ok(account) => account,
        Err(err) => {
            error!("Error looking up account: {:?}", err);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error looking up account").into_response();
        }
    };

    let Some(account) = account else {
        // No account matched: verify against the dummy hash anyway so
        // this path costs the same as a real verification.
        let _ = hasher::verify(&request.password, DUMMY_PASSWORD_HASH);
        debug!("Account not found");
        return unauthorized();
    };

    match hasher::verify(&request.password, &account.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            debug!("Password mismatch");
            return unauthorized();
        }
        Err(err) => {
            error!("Stored password hash is malformed: {:?}", err);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error verifying password").into_response();
        }
    }

    // Bind the token to the immutable id, not the username or email.
    match codec.issue(account.id, DEFAULT_TTL) {
        Ok(token) => (
            StatusCode::OK,
            Json(TokenResponse {
                token,
                token_type: "bearer".to_string(),
            }),
        )
            .into_response(),
        Err(err) => {
            error!("Error signing token: {:?}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error issuing token").into_response()
        }
    }
}
