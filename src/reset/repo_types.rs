use sqlx::FromRow;
use time::OffsetDateTime;

/// Password reset request. Rows are kept after use or expiry.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordReset {
    pub id: i64,
    pub email: String,
    pub code: String,  // 6 ASCII digits
    pub token: String, // 32 lowercase hex chars
    pub used: bool,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy)]
pub struct NewPasswordReset<'a> {
    pub email: &'a str,
    pub code: &'a str,
    pub token: &'a str,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}
