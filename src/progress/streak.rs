use serde::Serialize;
use time::{Date, OffsetDateTime, UtcOffset};

/// Points and streak counters of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub points: i32,
    pub streak: i32,
    /// `None` until the first correct answer.
    pub last_active_date: Option<OffsetDateTime>,
}

fn utc_day(at: OffsetDateTime) -> Date {
    at.to_offset(UtcOffset::UTC).date()
}

/// Applies one correct answer worth `task_points` at `now`.
///
/// The streak compares UTC calendar days, not elapsed time: a second answer on the
/// same day leaves it alone, an answer the day after extends it, anything else
/// (a gap, a future `last_active_date`, no activity yet) restarts it at 1.
/// Points are added on every call. Both counters stop at `i32::MAX`.
pub fn update_streak_and_points(progress: Progress, task_points: i32, now: OffsetDateTime) -> Progress {
    let today = utc_day(now);
    let last_day = progress.last_active_date.map(utc_day);

    let streak = match last_day {
        Some(day) if day == today => progress.streak,
        Some(day) if Some(day) == today.previous_day() => progress.streak.saturating_add(1),
        _ => 1,
    };

    Progress {
        points: progress.points.saturating_add(task_points),
        streak,
        last_active_date: Some(now),
    }
}
