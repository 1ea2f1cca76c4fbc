use time::OffsetDateTime;
use tracing::{debug, info};

use super::dto::TaskInput;
use super::repo_types::{NewAnswerLog, NewTask, Task};
use crate::auth::repo_types::User;
use crate::error::{AppError, AppResult};
use crate::progress::update_streak_and_points;
use crate::state::AppState;

pub const DEFAULT_TASK_POINTS: i32 = 10;
pub const HISTORY_LIMIT: i64 = 50;

/// Result of one answer attempt, with the user's totals afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub points: i32,
    pub streak: i32,
}

pub fn effective_points(points: Option<i32>) -> i32 {
    match points {
        Some(p) if p > 0 => p,
        _ => DEFAULT_TASK_POINTS,
    }
}

fn checked_input(input: &TaskInput) -> AppResult<(&str, &str)> {
    let question = input.question.trim();
    let answer = input.answer.trim();
    if question.is_empty() || answer.is_empty() {
        return Err(AppError::BadRequest("Question and answer are required".into()));
    }
    Ok((question, answer))
}

/// Logs the attempt and, when correct, credits points and streak.
pub async fn answer_task(
    st: &AppState,
    user: &User,
    task_id: i64,
    answer: &str,
    now: OffsetDateTime,
) -> AppResult<AnswerOutcome> {
    let task = st
        .tasks
        .find(task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    let correct = answer == task.answer;
    let log_id = st
        .tasks
        .log_answer(NewAnswerLog {
            user_id: user.id,
            task_id: task.id,
            user_answer: answer,
            correct,
            answered_at: now,
        })
        .await?;
    debug!(log_id, task_id, correct, "answer logged");

    if !correct {
        return Ok(AnswerOutcome {
            correct,
            points: user.points,
            streak: user.streak,
        });
    }

    let award = task.points.max(0);
    let progress = st
        .users
        .apply_progress(user.id, &|p| update_streak_and_points(p, award, now))
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    info!(user_id = user.id, task_id, points = progress.points, streak = progress.streak, "correct answer");
    Ok(AnswerOutcome {
        correct,
        points: progress.points,
        streak: progress.streak,
    })
}

pub async fn create_task(st: &AppState, admin: &User, input: &TaskInput) -> AppResult<Task> {
    let (question, answer) = checked_input(input)?;

    if st.tasks.find_conflict(question, answer).await?.is_some() {
        return Err(AppError::Conflict(
            "A task with the same question or answer already exists".into(),
        ));
    }

    let task = st
        .tasks
        .create(NewTask {
            question,
            answer,
            points: effective_points(input.points),
            created_by_id: admin.id,
        })
        .await?;
    info!(task_id = task.id, admin_id = admin.id, "task created");
    Ok(task)
}

pub async fn update_task(st: &AppState, id: i64, input: &TaskInput) -> AppResult<Task> {
    let mut task = st
        .tasks
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    let (question, answer) = checked_input(input)?;

    task.question = question.to_string();
    task.answer = answer.to_string();
    // Non-positive points keep the current value.
    if let Some(p) = input.points.filter(|p| *p > 0) {
        task.points = p;
    }

    let task = st.tasks.update(&task).await?;
    info!(task_id = task.id, "task updated");
    Ok(task)
}

pub async fn delete_task(st: &AppState, id: i64, now: OffsetDateTime) -> AppResult<()> {
    if !st.tasks.soft_delete(id, now).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }
    info!(task_id = id, "task deleted");
    Ok(())
}
