//! Account registration and token endpoints.

use std::sync::Arc;

use auth::TokenPair;
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use common::UserId;
use serde::{Deserialize, Serialize};
use store::Store;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::bearer_token;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateAccountRequest {
    pub nome: String,
    pub email: String,
    pub senha: String,
    pub ativo: Option<bool>,
    pub admin: Option<bool>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub senha: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct AccountResponse {
    pub usuario_id: UserId,
    pub nome: String,
    pub email: String,
    pub ativo: bool,
    pub admin: bool,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "bearer",
        }
    }
}

// -- Handlers --

/// POST /auth/create_account — register a new user.
#[tracing::instrument(skip(state, req))]
pub async fn create_account<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let user = state
        .accounts
        .register(
            req.nome,
            req.email,
            req.senha,
            req.ativo.unwrap_or(true),
            req.admin.unwrap_or(false),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            usuario_id: user.id,
            nome: user.name,
            email: user.email,
            ativo: user.active,
            admin: user.admin,
        }),
    ))
}

/// POST /auth/login — exchange credentials for a token pair.
#[tracing::instrument(skip(state, req))]
pub async fn login<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let pair = state.accounts.login(&req.email, &req.senha).await?;
    Ok(Json(pair.into()))
}

/// POST /auth/refresh_token — exchange a refresh token, passed as the
/// bearer credential, for a fresh pair.
#[tracing::instrument(skip(state, headers))]
pub async fn refresh_token<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = bearer_token(&headers)?;
    let pair = state.accounts.refresh(token).await?;
    Ok(Json(pair.into()))
}
