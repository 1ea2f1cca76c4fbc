use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use super::repo_types::{HistoryRow, NewAnswerLog, NewTask, Task};

/// Task bank and answer log. Soft-deleted tasks are invisible.
#[async_trait]
pub trait TaskRepo: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<Task>>;
    async fn random(&self) -> anyhow::Result<Option<Task>>;
    async fn find(&self, id: i64) -> anyhow::Result<Option<Task>>;
    /// A live task with the same question or the same answer.
    async fn find_conflict(&self, question: &str, answer: &str) -> anyhow::Result<Option<Task>>;
    async fn create(&self, new: NewTask<'_>) -> anyhow::Result<Task>;
    /// Saves question, answer and points.
    async fn update(&self, task: &Task) -> anyhow::Result<Task>;
    async fn soft_delete(&self, id: i64, at: OffsetDateTime) -> anyhow::Result<bool>;
    /// Returns the log entry id.
    async fn log_answer(&self, log: NewAnswerLog<'_>) -> anyhow::Result<i64>;
    /// Newest first.
    async fn history(&self, user_id: i64, limit: i64) -> anyhow::Result<Vec<HistoryRow>>;
}

#[derive(Clone)]
pub struct PgTaskRepo {
    db: PgPool,
}

impl PgTaskRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskRepo for PgTaskRepo {
    async fn list(&self) -> anyhow::Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, question, answer, points, created_by_id, created_at, updated_at
              FROM tasks
             WHERE deleted_at IS NULL
             ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list tasks")?;
        Ok(rows)
    }

    async fn random(&self) -> anyhow::Result<Option<Task>> {
        let row = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, question, answer, points, created_by_id, created_at, updated_at
              FROM tasks
             WHERE deleted_at IS NULL
             ORDER BY random()
             LIMIT 1
            "#,
        )
        .fetch_optional(&self.db)
        .await
        .context("random task")?;
        Ok(row)
    }

    async fn find(&self, id: i64) -> anyhow::Result<Option<Task>> {
        let row = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, question, answer, points, created_by_id, created_at, updated_at
              FROM tasks
             WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find task")?;
        Ok(row)
    }

    async fn find_conflict(&self, question: &str, answer: &str) -> anyhow::Result<Option<Task>> {
        let row = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, question, answer, points, created_by_id, created_at, updated_at
              FROM tasks
             WHERE (question = $1 OR answer = $2) AND deleted_at IS NULL
             LIMIT 1
            "#,
        )
        .bind(question)
        .bind(answer)
        .fetch_optional(&self.db)
        .await
        .context("find conflicting task")?;
        Ok(row)
    }

    async fn create(&self, new: NewTask<'_>) -> anyhow::Result<Task> {
        let row = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (question, answer, points, created_by_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, question, answer, points, created_by_id, created_at, updated_at
            "#,
        )
        .bind(new.question)
        .bind(new.answer)
        .bind(new.points)
        .bind(new.created_by_id)
        .fetch_one(&self.db)
        .await
        .context("insert task")?;
        Ok(row)
    }

    async fn update(&self, task: &Task) -> anyhow::Result<Task> {
        let row = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
               SET question = $2, answer = $3, points = $4, updated_at = now()
             WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, question, answer, points, created_by_id, created_at, updated_at
            "#,
        )
        .bind(task.id)
        .bind(&task.question)
        .bind(&task.answer)
        .bind(task.points)
        .fetch_one(&self.db)
        .await
        .context("update task")?;
        Ok(row)
    }

    async fn soft_delete(&self, id: i64, at: OffsetDateTime) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE tasks SET deleted_at = $2
             WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.db)
        .await
        .context("soft delete task")?;
        Ok(res.rows_affected() == 1)
    }

    async fn log_answer(&self, log: NewAnswerLog<'_>) -> anyhow::Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO user_task_logs (user_id, task_id, user_answer, correct, answered_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(log.user_id)
        .bind(log.task_id)
        .bind(log.user_answer)
        .bind(log.correct)
        .bind(log.answered_at)
        .fetch_one(&self.db)
        .await
        .context("insert answer log")?;
        Ok(id)
    }

    async fn history(&self, user_id: i64, limit: i64) -> anyhow::Result<Vec<HistoryRow>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT l.id, l.task_id, t.question, t.answer, l.user_answer, l.correct,
                   t.points, l.answered_at
              FROM user_task_logs l
              JOIN tasks t ON t.id = l.task_id
             WHERE l.user_id = $1 AND t.deleted_at IS NULL
             ORDER BY l.answered_at DESC, l.id DESC
             LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .context("answer history")?;
        Ok(rows)
    }
}
