//! Request extractors for authenticated routes.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use domain::User;
use store::Store;

use crate::AppState;
use crate::error::ApiError;

/// The authenticated caller, resolved from the `Authorization: Bearer`
/// header. Rejects with 401 when the token is missing, invalid, of the
/// refresh class, or belongs to a missing/inactive user.
pub struct CurrentUser(pub User);

/// Pulls the bearer token out of an `Authorization` header value set.
pub(crate) fn bearer_token(headers: &axum::http::HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))
}

impl<S: Store + 'static> FromRequestParts<Arc<AppState<S>>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let user = state.accounts.authenticate(token).await?;
        Ok(CurrentUser(user))
    }
}
