use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::auth::repo_types::{NewUser, User};
use crate::progress::Progress;

/// Progress transition applied under the user's row lock.
pub type ProgressUpdate<'a> = &'a (dyn Fn(Progress) -> Progress + Send + Sync);

/// Account store. Every lookup ignores soft-deleted rows.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn create(&self, new: NewUser<'_>) -> anyhow::Result<User>;
    /// Saves username, email and password hash.
    async fn update_profile(&self, user: &User) -> anyhow::Result<User>;
    /// Returns false when no live user has this id.
    async fn soft_delete(&self, id: i64, at: OffsetDateTime) -> anyhow::Result<bool>;
    async fn list(&self) -> anyhow::Result<Vec<User>>;
    async fn top_by_points(&self, limit: i64) -> anyhow::Result<Vec<User>>;
    /// Read-modify-write of points/streak/last_active_date, serialized per user.
    /// `None` when the user does not exist.
    async fn apply_progress(
        &self,
        id: i64,
        update: ProgressUpdate<'_>,
    ) -> anyhow::Result<Option<Progress>>;
}

/// True when the error chain carries a unique-constraint violation.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|db| db.is_unique_violation())
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, points, streak,
                   last_active_date, created_at
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, points, streak,
                   last_active_date, created_at
            FROM users
            WHERE email = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, points, streak,
                   last_active_date, created_at
            FROM users
            WHERE username = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .context("find user by username")?;
        Ok(user)
    }

    async fn create(&self, new: NewUser<'_>) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, role, points, streak,
                      last_active_date, created_at
            "#,
        )
        .bind(new.username)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.role.as_str())
        .fetch_one(&self.db)
        .await
        .context("insert user")?;
        Ok(user)
    }

    async fn update_profile(&self, user: &User) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET username = $2, email = $3, password_hash = $4, updated_at = now()
             WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, username, email, password_hash, role, points, streak,
                      last_active_date, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await
        .context("update user profile")?;
        Ok(user)
    }

    async fn soft_delete(&self, id: i64, at: OffsetDateTime) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE users SET deleted_at = $2
             WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.db)
        .await
        .context("soft delete user")?;
        Ok(res.rows_affected() == 1)
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, points, streak,
                   last_active_date, created_at
            FROM users
            WHERE deleted_at IS NULL
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list users")?;
        Ok(rows)
    }

    async fn top_by_points(&self, limit: i64) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, points, streak,
                   last_active_date, created_at
            FROM users
            WHERE deleted_at IS NULL
            ORDER BY points DESC, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .context("top users by points")?;
        Ok(rows)
    }

    async fn apply_progress(
        &self,
        id: i64,
        update: ProgressUpdate<'_>,
    ) -> anyhow::Result<Option<Progress>> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        let row = sqlx::query_as::<_, (i32, i32, Option<OffsetDateTime>)>(
            r#"
            SELECT points, streak, last_active_date
              FROM users
             WHERE id = $1 AND deleted_at IS NULL
             FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("lock user progress")?;

        let Some((points, streak, last_active_date)) = row else {
            return Ok(None);
        };

        let next = update(Progress {
            points,
            streak,
            last_active_date,
        });

        sqlx::query(
            r#"
            UPDATE users
               SET points = $2, streak = $3, last_active_date = $4, updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(next.points)
        .bind(next.streak)
        .bind(next.last_active_date)
        .execute(&mut *tx)
        .await
        .context("save user progress")?;

        tx.commit().await.context("commit tx")?;
        Ok(Some(next))
    }
}
