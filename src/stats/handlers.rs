use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::dto::{LeaderboardEntry, StreakResponse};
use crate::{
    auth::extractors::CurrentUser,
    error::{ApiResponse, AppResult},
    state::AppState,
};

pub const LEADERBOARD_SIZE: i64 = 10;

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/stats", get(leaderboard))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/user/streak", get(streak))
}

#[instrument(skip_all)]
pub async fn leaderboard(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<LeaderboardEntry>>>> {
    let users = state.users.top_by_points(LEADERBOARD_SIZE).await?;
    Ok(ApiResponse::ok(
        "Leaderboard",
        users.into_iter().map(LeaderboardEntry::from).collect(),
    ))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn streak(CurrentUser(user): CurrentUser) -> Json<ApiResponse<StreakResponse>> {
    ApiResponse::ok("Current streak", StreakResponse::from(user.progress()))
}
