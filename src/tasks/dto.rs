use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo_types::{HistoryRow, Task};

/// Task as shown to players; never includes the answer.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i64,
    pub question: String,
    pub points: i32,
}

impl From<Task> for TaskResponse {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            question: t.question,
            points: t.points,
        }
    }
}

/// Full task for the admin panel.
#[derive(Debug, Serialize)]
pub struct AdminTask {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub points: i32,
    pub created_by_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Task> for AdminTask {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            question: t.question,
            answer: t.answer,
            points: t.points,
            created_by_id: t.created_by_id,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub correct: bool,
    pub points: i32,
    pub streak: i32,
}

/// Create/update body. `points <= 0` or absent falls back to the default.
#[derive(Debug, Deserialize)]
pub struct TaskInput {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub points: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub id: i64,
    pub task_id: i64,
    pub question: String,
    pub answer: String,
    pub user_answer: String,
    pub correct: bool,
    pub points: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub answered_at: OffsetDateTime,
}

impl From<HistoryRow> for HistoryItem {
    fn from(r: HistoryRow) -> Self {
        Self {
            id: r.id,
            task_id: r.task_id,
            question: r.question,
            answer: r.answer,
            user_answer: r.user_answer,
            correct: r.correct,
            points: r.points,
            answered_at: r.answered_at,
        }
    }
}
