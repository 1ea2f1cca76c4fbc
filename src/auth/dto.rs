use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo_types::{Role, User};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Partial profile update; absent or empty fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Response returned after login or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: SafeUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct SafeUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub points: i32,
    pub streak: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&User> for SafeUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
            role: u.role,
            points: u.points,
            streak: u.streak,
            created_at: u.created_at,
        }
    }
}
