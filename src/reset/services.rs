use rand::rngs::OsRng;
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};

use super::codes::{generate_code, generate_token};
use super::repo_types::NewPasswordReset;
use crate::auth::{password::hash_password, services::normalize_email};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Lifetime of a reset request.
pub const RESET_TTL: Duration = Duration::hours(1);

/// Returned by a successful code verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedReset {
    pub email: String,
    pub token: String,
}

/// Issues a reset code for `email` and mails it.
///
/// An unknown email is not an error: nothing is stored or sent, and the caller
/// sees the same `Ok(())` as for a registered address.
pub async fn request_reset(st: &AppState, email: &str, now: OffsetDateTime) -> AppResult<()> {
    let email = normalize_email(email);

    let Some(user) = st.users.find_by_email(&email).await.map_err(AppError::Persistence)? else {
        info!("password reset requested for unknown email");
        return Ok(());
    };

    let code = generate_code(&mut OsRng).map_err(|e| AppError::GenerationFailure(e.to_string()))?;
    let token = generate_token(&mut OsRng).map_err(|e| AppError::GenerationFailure(e.to_string()))?;

    let reset = st
        .resets
        .create(NewPasswordReset {
            email: &user.email,
            code: &code,
            token: &token,
            expires_at: now + RESET_TTL,
            created_at: now,
        })
        .await
        .map_err(AppError::Persistence)?;

    st.mailer
        .send_reset_code(&user.email, &code)
        .await
        .map_err(AppError::Delivery)?;

    info!(reset_id = reset.id, user_id = user.id, "password reset issued");
    Ok(())
}

/// Checks a code without consuming it.
pub async fn verify_code(
    st: &AppState,
    email: &str,
    code: &str,
    now: OffsetDateTime,
) -> AppResult<VerifiedReset> {
    let email = normalize_email(email);
    let reset = st
        .resets
        .find_active_by_code(&email, code.trim(), now)
        .await
        .map_err(AppError::Persistence)?
        .ok_or_else(|| {
            warn!("reset code rejected");
            AppError::InvalidOrExpired
        })?;

    Ok(VerifiedReset {
        email: reset.email,
        token: reset.token,
    })
}

/// Sets a new password and consumes the reset request. Succeeds at most once
/// per request.
pub async fn complete_reset(
    st: &AppState,
    email: &str,
    token: &str,
    code: &str,
    new_password: &str,
    now: OffsetDateTime,
) -> AppResult<()> {
    let email = normalize_email(email);
    let reset = st
        .resets
        .find_active_by_token(&email, token.trim(), code.trim(), now)
        .await
        .map_err(AppError::Persistence)?
        .ok_or_else(|| {
            warn!("reset completion rejected");
            AppError::InvalidOrExpired
        })?;

    let user = st
        .users
        .find_by_email(&email)
        .await
        .map_err(AppError::Persistence)?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let hash = hash_password(new_password).map_err(AppError::Internal)?;

    if !st
        .resets
        .complete(reset.id, user.id, &hash, now)
        .await
        .map_err(AppError::Persistence)?
    {
        warn!(reset_id = reset.id, "reset consumed concurrently");
        return Err(AppError::InvalidOrExpired);
    }

    info!(reset_id = reset.id, user_id = user.id, "password reset completed");
    Ok(())
}
