use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use super::dto::{ForgotPasswordRequest, ResetPasswordRequest, VerifyCodeRequest, VerifyCodeResponse};
use super::services;
use crate::{
    auth::services::check_password,
    error::{ApiResponse, AppResult},
    state::AppState,
};

/// Same text whether or not the email belongs to an account.
const RESET_REQUESTED: &str = "If the email is registered, a reset code has been sent to it";

pub fn reset_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/verify-reset-code", post(verify_reset_code))
        .route("/auth/reset-password", post(reset_password))
}

#[instrument(skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    services::request_reset(&state, &payload.email, state.clock.now()).await?;
    Ok(ApiResponse::message(RESET_REQUESTED))
}

#[instrument(skip_all)]
pub async fn verify_reset_code(
    State(state): State<AppState>,
    Json(payload): Json<VerifyCodeRequest>,
) -> AppResult<Json<ApiResponse<VerifyCodeResponse>>> {
    let verified =
        services::verify_code(&state, &payload.email, &payload.code, state.clock.now()).await?;
    Ok(ApiResponse::ok(
        "Code verified",
        VerifyCodeResponse {
            token: verified.token,
            email: verified.email,
        },
    ))
}

#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    check_password(&payload.new_password)?;
    services::complete_reset(
        &state,
        &payload.email,
        &payload.token,
        &payload.code,
        &payload.new_password,
        state.clock.now(),
    )
    .await?;
    Ok(ApiResponse::message("Password changed"))
}
