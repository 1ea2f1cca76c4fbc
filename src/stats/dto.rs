use serde::Serialize;

use crate::auth::repo_types::User;
use crate::progress::Progress;

/// Leaderboard row.
#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub points: i32,
    pub streak: i32,
}

impl From<User> for LeaderboardEntry {
    fn from(u: User) -> Self {
        Self {
            username: u.username,
            points: u.points,
            streak: u.streak,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StreakResponse {
    pub points: i32,
    pub streak: i32,
}

impl From<Progress> for StreakResponse {
    fn from(p: Progress) -> Self {
        Self {
            points: p.points,
            streak: p.streak,
        }
    }
}
