use axum::{
    extract::{FromRef, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, SafeUser, UpdateProfileRequest},
        extractors::CurrentUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::is_unique_violation,
        repo_types::{NewUser, Role, User},
        services::{check_password, check_username, checked_email},
    },
    error::{ApiResponse, AppError, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/profile", get(profile).put(update_profile))
        .route("/user/logout", post(logout))
}

fn conflict_or_persistence(e: anyhow::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::Conflict("Username or email already registered".into())
    } else {
        AppError::Persistence(e)
    }
}

fn issue_tokens(keys: &JwtKeys, user: &User) -> AppResult<AuthResponse> {
    let access_token = keys
        .sign_access(user.id, user.role)
        .map_err(AppError::Internal)?;
    let refresh_token = keys
        .sign_refresh(user.id, user.role)
        .map_err(AppError::Internal)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: SafeUser::from(user),
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SafeUser>>)> {
    let username = payload.username.trim();
    check_username(username)?;
    let email = checked_email(&payload.email)?;
    check_password(&payload.password)?;

    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }
    if state.users.find_by_username(username).await?.is_some() {
        warn!(username, "username already taken");
        return Err(AppError::Conflict("Username already taken".into()));
    }

    let hash = hash_password(&payload.password).map_err(AppError::Internal)?;
    let role = if state.config.is_admin_email(&email) {
        Role::Admin
    } else {
        Role::User
    };

    let user = state
        .users
        .create(NewUser {
            username,
            email: &email,
            password_hash: &hash,
            role,
        })
        .await
        .map_err(conflict_or_persistence)?;

    info!(user_id = user.id, role = user.role.as_str(), "user registered");
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Registration successful", SafeUser::from(&user)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let email = checked_email(&payload.email)?;

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    };

    if !verify_password(&payload.password, &user.password_hash).map_err(AppError::Internal)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let tokens = issue_tokens(&keys, &user)?;
    info!(user_id = user.id, "user logged in");
    Ok(ApiResponse::ok("Login successful", tokens))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        AppError::Unauthorized("Invalid or expired token".into())
    })?;

    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    let tokens = issue_tokens(&keys, &user)?;
    Ok(ApiResponse::ok("Token refreshed", tokens))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn profile(CurrentUser(user): CurrentUser) -> Json<ApiResponse<SafeUser>> {
    ApiResponse::ok("User profile", SafeUser::from(&user))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(mut user): CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<SafeUser>>> {
    let mut changed = false;

    if let Some(username) = payload.username.as_deref().map(str::trim) {
        if !username.is_empty() && username != user.username {
            check_username(username)?;
            if let Some(other) = state.users.find_by_username(username).await? {
                if other.id != user.id {
                    return Err(AppError::Conflict("Username already taken".into()));
                }
            }
            user.username = username.to_string();
            changed = true;
        }
    }

    if let Some(raw) = payload.email.as_deref().filter(|e| !e.trim().is_empty()) {
        let email = checked_email(raw)?;
        if email != user.email {
            if let Some(other) = state.users.find_by_email(&email).await? {
                if other.id != user.id {
                    return Err(AppError::Conflict("Email already registered".into()));
                }
            }
            user.email = email;
            changed = true;
        }
    }

    if let Some(password) = payload.password.as_deref().filter(|p| !p.is_empty()) {
        check_password(password)?;
        user.password_hash = hash_password(password).map_err(AppError::Internal)?;
        changed = true;
    }

    if changed {
        user = state
            .users
            .update_profile(&user)
            .await
            .map_err(conflict_or_persistence)?;
        info!("profile updated");
    }

    Ok(ApiResponse::ok("Profile updated", SafeUser::from(&user)))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn logout(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    info!("user logged out");
    (
        [(header::SET_COOKIE, "token=; Path=/; Max-Age=0; HttpOnly")],
        ApiResponse::message("Logged out"),
    )
}
