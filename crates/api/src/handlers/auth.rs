//! Handlers for the `/auth` resource (generate, refresh).

use axum::extract::rejection::{FormRejection, JsonRejection, QueryRejection};
use axum::extract::{Form, Query, State};
use axum::Json;
use serde::Deserialize;
use tokenward_core::types::TokenPair;

use crate::error::{AppError, AppResult};
use crate::middleware::client_addr::ClientAddr;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query string or urlencoded form body for `/auth/generate`.
///
/// A missing `id` deserializes to an empty string so the service reports it
/// as a bad request with the standard error body.
#[derive(Debug, Deserialize)]
pub struct GenerateParams {
    #[serde(default)]
    pub id: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET|POST /api/v1/auth/generate?id={user_id}
///
/// Issue a fresh pair bound to the caller's address. On POST the `id` may
/// also come from an `application/x-www-form-urlencoded` body, which takes
/// precedence over the query string.
pub async fn generate(
    State(state): State<AppState>,
    ClientAddr(address): ClientAddr,
    query: Result<Query<GenerateParams>, QueryRejection>,
    form: Result<Form<GenerateParams>, FormRejection>,
) -> AppResult<Json<TokenPair>> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let user_id = match form {
        Ok(Form(body)) if !body.id.is_empty() => body.id,
        _ => query.id,
    };

    let pair = state.tokens.issue_pair(&user_id, &address).await?;
    Ok(Json(pair))
}

/// POST /api/v1/auth/refresh
///
/// Exchange an access token and its refresh secret for a new pair. The
/// presented session is revoked whether or not the caller's address changed.
/// A body that is not the expected JSON is a bad request.
pub async fn refresh(
    State(state): State<AppState>,
    ClientAddr(address): ClientAddr,
    input: Result<Json<RefreshRequest>, JsonRejection>,
) -> AppResult<Json<TokenPair>> {
    let Json(input) = input.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let pair = state
        .tokens
        .refresh_pair(&input.access_token, &input.refresh_token, &address)
        .await?;
    Ok(Json(pair))
}
