//! Store-backed entry points for the dashboard and leaderboard views.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::{error::TrackerResult, models::TimeEntry, store::TimeStore};

use super::{
    aggregate::{dashboard_summary, per_task_breakdown, recent_activity, today_entries},
    calendar::start_of_week,
    leaderboard::leaderboard,
    weekly::weekly_stats,
    DashboardSummary, LeaderboardRow, TaskBreakdown, WeeklyStats,
};

pub const RECENT_ACTIVITY_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub summary: DashboardSummary,
    pub breakdown: Vec<TaskBreakdown>,
    pub weekly: WeeklyStats,
    pub recent: Vec<TimeEntry>,
}

pub async fn load_dashboard<Tz: TimeZone>(
    store: &dyn TimeStore,
    owner: &str,
    now: &DateTime<Tz>,
) -> TrackerResult<Dashboard> {
    let tasks = store.list_tasks(owner).await?;
    let entries = store.list_time_entries(owner).await?;
    let today = today_entries(&entries, now);

    Ok(Dashboard {
        summary: dashboard_summary(&tasks, &entries, now),
        breakdown: per_task_breakdown(&tasks, &entries, &today),
        weekly: weekly_stats(&tasks, &entries, now),
        recent: recent_activity(&today, RECENT_ACTIVITY_LIMIT),
    })
}

pub async fn weekly_leaderboard<Tz: TimeZone>(
    store: &dyn TimeStore,
    now: &DateTime<Tz>,
) -> TrackerResult<Vec<LeaderboardRow>> {
    let since = start_of_week(now).with_timezone(&Utc);
    let entries = store.list_entries_since(since).await?;
    let users = store.list_users().await?;
    Ok(leaderboard(&entries, &users, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTask, User};
    use crate::store::memory::MemoryStore;
    use chrono::Duration;

    fn entry(owner: &str, task_id: &str, start: DateTime<Utc>, duration: u64) -> TimeEntry {
        TimeEntry {
            id: format!("{owner}-{}", start.timestamp()),
            task_id: task_id.into(),
            owner: owner.into(),
            start_time: start,
            end_time: Some(start + Duration::seconds(duration as i64)),
            duration,
            description: None,
        }
    }

    #[tokio::test]
    async fn leaderboard_reads_every_owner() {
        let store = MemoryStore::new();
        let now = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();
        for (identity, name) in [("alice", "Alice"), ("bob", "Bob"), ("carol", "Carol")] {
            store
                .upsert_user(&User {
                    identity: identity.into(),
                    display_name: name.into(),
                    created_at: now,
                })
                .await
                .unwrap();
        }
        store
            .create_time_entry(&entry("bob", "t", now - Duration::hours(2), 1800))
            .await
            .unwrap();
        store
            .create_time_entry(&entry("alice", "t", now - Duration::hours(1), 3600))
            .await
            .unwrap();

        let rows = weekly_leaderboard(&store, &now).await.unwrap();
        let names: Vec<&str> = rows.iter().map(|row| row.display_name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[tokio::test]
    async fn dashboard_combines_views() {
        let store = MemoryStore::new();
        let now = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();
        let task = store
            .create_task(
                "alice",
                NewTask {
                    name: "Reading".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store
            .create_time_entry(&entry("alice", &task.id, now - Duration::hours(3), 900))
            .await
            .unwrap();

        let dashboard = load_dashboard(&store, "alice", &now).await.unwrap();
        assert_eq!(dashboard.summary.today_time, 900);
        assert_eq!(dashboard.breakdown[0].percentage, 100.0);
        assert_eq!(dashboard.weekly.total_time, 900);
        assert_eq!(dashboard.recent.len(), 1);
    }
}
