use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use super::dto::{AdminTask, AnswerRequest, AnswerResponse, HistoryItem, TaskInput, TaskResponse};
use super::services::{self, HISTORY_LIMIT};
use crate::{
    auth::extractors::{AdminUser, CurrentUser},
    error::{ApiResponse, AppError, AppResult},
    state::AppState,
};

// --- routers ---

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/task", get(random_task))
        .route("/user/task/:id/answer", post(answer_task))
        .route("/user/history", get(history))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/tasks", get(list_tasks))
        .route("/admin/task", post(create_task))
        .route("/admin/task/:id", put(update_task).delete(delete_task))
}

// --- player handlers ---

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn random_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<ApiResponse<TaskResponse>>> {
    let task = state
        .tasks
        .random()
        .await?
        .ok_or_else(|| AppError::NotFound("No tasks available".into()))?;
    Ok(ApiResponse::ok("Task", TaskResponse::from(task)))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn answer_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<AnswerRequest>,
) -> AppResult<Json<ApiResponse<AnswerResponse>>> {
    let outcome =
        services::answer_task(&state, &user, id, &payload.answer, state.clock.now()).await?;
    let message = if outcome.correct {
        "Correct answer"
    } else {
        "Wrong answer"
    };
    Ok(ApiResponse::ok(
        message,
        AnswerResponse {
            correct: outcome.correct,
            points: outcome.points,
            streak: outcome.streak,
        },
    ))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<HistoryItem>>>> {
    let rows = state.tasks.history(user.id, HISTORY_LIMIT).await?;
    let items = rows.into_iter().map(HistoryItem::from).collect();
    Ok(ApiResponse::ok("Answer history", items))
}

// --- admin handlers ---

#[instrument(skip_all)]
pub async fn list_tasks(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> AppResult<Json<ApiResponse<Vec<AdminTask>>>> {
    let tasks = state.tasks.list().await?;
    Ok(ApiResponse::ok(
        "Tasks",
        tasks.into_iter().map(AdminTask::from).collect(),
    ))
}

#[instrument(skip_all, fields(admin_id = admin.id))]
pub async fn create_task(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<TaskInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<AdminTask>>)> {
    let task = services::create_task(&state, &admin, &payload).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Task created", AdminTask::from(task)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_task(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<TaskInput>,
) -> AppResult<Json<ApiResponse<AdminTask>>> {
    let task = services::update_task(&state, id, &payload).await?;
    Ok(ApiResponse::ok("Task updated", AdminTask::from(task)))
}

#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    services::delete_task(&state, id, state.clock.now()).await?;
    Ok(ApiResponse::message("Task deleted"))
}
