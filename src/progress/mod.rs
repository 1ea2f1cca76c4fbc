mod streak;

pub use streak::{update_streak_and_points, Progress};
