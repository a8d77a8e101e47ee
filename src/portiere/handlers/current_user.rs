//! Bearer-authenticated self-service endpoints.
//!
//! Flow Overview:
//! 1) Verify the presented token and resolve its subject to an account.
//! 2) Return the account projection, or delete the account.
//!
//! A token naming an account that no longer exists fails here with the
//! same 401 as any bad token; that is the only mechanism by which
//! deletion revokes outstanding tokens.

use crate::{
    directory::{Account, DynAccountStore},
    portiere::handlers::extract_bearer_token,
    token::TokenCodec,
};
use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::ToSchema;

/// Outward account projection. There is deliberately no password field
/// here; the stored hash never leaves the directory.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AccountResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_active: bool,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            is_active: account.is_active,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct DeleteResponse {
    pub username: String,
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Could not validate credentials").into_response()
}

/// Resolve the bearer token on the request to a live account.
///
/// Missing header, invalid or expired token, and vanished account all
/// collapse into the same 401 response.
async fn require_account(
    headers: &HeaderMap,
    codec: &TokenCodec,
    store: &DynAccountStore,
) -> Result<Account, Response> {
    let Some(token) = extract_bearer_token(headers) else {
        debug!("Missing bearer token");
        return Err(unauthorized());
    };

    let subject = codec.verify(token).map_err(|_| unauthorized())?;

    match store.find_by_id(subject).await {
        Ok(Some(account)) => Ok(account),
        Ok(None) => {
            debug!("Token subject no longer exists");
            Err(unauthorized())
        }
        Err(err) => {
            error!("Error resolving token subject: {:?}", err);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Error resolving account").into_response())
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/current_user",
    responses(
        (status = 200, description = "The authenticated account", body = AccountResponse),
        (status = 401, description = "Missing, invalid or expired bearer token"),
    ),
    tag = "auth"
)]
pub async fn get_current_user(
    headers: HeaderMap,
    codec: Extension<Arc<TokenCodec>>,
    store: Extension<DynAccountStore>,
) -> impl IntoResponse {
    let account = match require_account(&headers, &codec, &store).await {
        Ok(account) => account,
        Err(response) => return response,
    };

    (StatusCode::OK, Json(AccountResponse::from(account))).into_response()
}

#[utoipa::path(
    delete,
    path = "/api/auth/current_user",
    responses(
        (status = 200, description = "Account deleted", body = DeleteResponse),
        (status = 401, description = "Missing, invalid or expired bearer token"),
        (status = 500, description = "The deletion did not remove anything"),
    ),
    tag = "auth"
)]
pub async fn delete_current_user(
    headers: HeaderMap,
    codec: Extension<Arc<TokenCodec>>,
    store: Extension<DynAccountStore>,
) -> impl IntoResponse {
    let account = match require_account(&headers, &codec, &store).await {
        Ok(account) => account,
        Err(response) => return response,
    };

    // The caller is authenticated; a failure past this point is the
    // store's, not theirs, hence 500 and not 401.
    match store.delete(&account.username).await {
        Ok(true) => (
            StatusCode::OK,
            Json(DeleteResponse {
                username: account.username,
            }),
        )
            .into_response(),
        Ok(false) => {
            error!("Account vanished before deletion");
            (StatusCode::INTERNAL_SERVER_ERROR, "Account deletion failed").into_response()
        }
        Err(err) => {
            error!("Error deleting account: {:?}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Account deletion failed").into_response()
        }
    }
}
