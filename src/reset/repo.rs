use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use super::repo_types::{NewPasswordReset, PasswordReset};

#[async_trait]
pub trait ResetRepo: Send + Sync {
    async fn create(&self, new: NewPasswordReset<'_>) -> anyhow::Result<PasswordReset>;

    /// Newest unused, unexpired request for `(email, code)`.
    async fn find_active_by_code(
        &self,
        email: &str,
        code: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<PasswordReset>>;

    /// Newest unused, unexpired request for `(email, token, code)`.
    async fn find_active_by_token(
        &self,
        email: &str,
        token: &str,
        code: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<PasswordReset>>;

    /// Atomically marks the request used and stores the new password hash.
    ///
    /// Returns false, changing nothing, when the request was already used, has
    /// expired, or the user is gone.
    async fn complete(
        &self,
        reset_id: i64,
        user_id: i64,
        password_hash: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgResetRepo {
    db: PgPool,
}

impl PgResetRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ResetRepo for PgResetRepo {
    async fn create(&self, new: NewPasswordReset<'_>) -> anyhow::Result<PasswordReset> {
        let row = sqlx::query_as::<_, PasswordReset>(
            r#"
            INSERT INTO password_resets (email, code, token, used, expires_at, created_at)
            VALUES ($1, $2, $3, FALSE, $4, $5)
            RETURNING id, email, code, token, used, expires_at, created_at
            "#,
        )
        .bind(new.email)
        .bind(new.code)
        .bind(new.token)
        .bind(new.expires_at)
        .bind(new.created_at)
        .fetch_one(&self.db)
        .await
        .context("insert password reset")?;
        Ok(row)
    }

    async fn find_active_by_code(
        &self,
        email: &str,
        code: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<PasswordReset>> {
        let row = sqlx::query_as::<_, PasswordReset>(
            r#"
            SELECT id, email, code, token, used, expires_at, created_at
              FROM password_resets
             WHERE email = $1 AND code = $2 AND used = FALSE AND expires_at > $3
             ORDER BY created_at DESC, id DESC
             LIMIT 1
            "#,
        )
        .bind(email)
        .bind(code)
        .bind(now)
        .fetch_optional(&self.db)
        .await
        .context("find reset by code")?;
        Ok(row)
    }

    async fn find_active_by_token(
        &self,
        email: &str,
        token: &str,
        code: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<PasswordReset>> {
        let row = sqlx::query_as::<_, PasswordReset>(
            r#"
            SELECT id, email, code, token, used, expires_at, created_at
              FROM password_resets
             WHERE email = $1 AND token = $2 AND code = $3
               AND used = FALSE AND expires_at > $4
             ORDER BY created_at DESC, id DESC
             LIMIT 1
            "#,
        )
        .bind(email)
        .bind(token)
        .bind(code)
        .bind(now)
        .fetch_optional(&self.db)
        .await
        .context("find reset by token")?;
        Ok(row)
    }

    async fn complete(
        &self,
        reset_id: i64,
        user_id: i64,
        password_hash: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        // Conditional claim: only one concurrent completion can flip `used`.
        let claimed = sqlx::query(
            r#"
            UPDATE password_resets SET used = TRUE
             WHERE id = $1 AND used = FALSE AND expires_at > $2
            "#,
        )
        .bind(reset_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .context("mark reset used")?;
        if claimed.rows_affected() != 1 {
            return Ok(false);
        }

        let updated = sqlx::query(
            r#"
            UPDATE users SET password_hash = $2, updated_at = now()
             WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await
        .context("update password")?;
        if updated.rows_affected() != 1 {
            return Ok(false);
        }

        tx.commit().await.context("commit tx")?;
        Ok(true)
    }
}
