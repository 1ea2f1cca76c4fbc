use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{dto::SafeUser, extractors::AdminUser},
    error::{ApiResponse, AppError, AppResult},
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", delete(delete_user))
}

#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> AppResult<Json<ApiResponse<Vec<SafeUser>>>> {
    let users = state.users.list().await?;
    Ok(ApiResponse::ok(
        "Users",
        users.iter().map(SafeUser::from).collect(),
    ))
}

#[instrument(skip(state, admin), fields(admin_id = admin.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !state.users.soft_delete(id, state.clock.now()).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    info!(user_id = id, "user deleted");
    Ok(ApiResponse::message("User deleted"))
}
