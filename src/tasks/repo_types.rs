use sqlx::FromRow;
use time::OffsetDateTime;

/// Quiz task in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Task {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub points: i32,
    pub created_by_id: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy)]
pub struct NewTask<'a> {
    pub question: &'a str,
    pub answer: &'a str,
    pub points: i32,
    pub created_by_id: i64,
}

/// One answer attempt, right or wrong.
#[derive(Debug, Clone, Copy)]
pub struct NewAnswerLog<'a> {
    pub user_id: i64,
    pub task_id: i64,
    pub user_answer: &'a str,
    pub correct: bool,
    pub answered_at: OffsetDateTime,
}

/// Answer log joined with its (live) task.
#[derive(Debug, Clone, FromRow)]
pub struct HistoryRow {
    pub id: i64,
    pub task_id: i64,
    pub question: String,
    pub answer: String,
    pub user_answer: String,
    pub correct: bool,
    pub points: i32,
    pub answered_at: OffsetDateTime,
}
