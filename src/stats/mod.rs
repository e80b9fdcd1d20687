//! Dashboard and leaderboard derivations. Everything here except `service` is
//! a pure function over plain data.

pub mod aggregate;
pub mod calendar;
pub mod commands;
pub mod leaderboard;
pub mod service;
pub mod weekly;

pub use aggregate::{
    dashboard_summary, entries_for_task, per_task_breakdown, recent_activity, today_entries,
    total_for, total_for_task, week_entries, DashboardSummary, TaskBreakdown,
};
pub use calendar::{start_of_day, start_of_next_day, start_of_week};
pub use leaderboard::{leaderboard, LeaderboardRow, LEADERBOARD_LIMIT};
pub use weekly::{weekly_stats, DailyStats, DailyTaskTime, WeeklyStats};
