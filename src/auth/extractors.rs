use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::jwt::JwtKeys;
use super::repo_types::User;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated, live account resolved from the bearer access token.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify_access(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::Unauthorized("Invalid or expired token".into())
        })?;

        let user = state
            .users
            .find_by_id(claims.sub)
            .await
            .map_err(AppError::Persistence)?
            .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

        Ok(CurrentUser(user))
    }
}

/// `CurrentUser` whose stored role is admin.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            warn!(user_id = user.id, "admin route denied");
            return Err(AppError::Forbidden("Admin role required".into()));
        }
        Ok(AdminUser(user))
    }
}
