use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::models::{TimeEntry, User};

use super::calendar::start_of_week;

pub const LEADERBOARD_LIMIT: usize = 10;

/// Weekly aggregate for one owner. Derived on demand, never stored.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub owner: String,
    pub display_name: String,
    pub total_time: u64,
    /// Number of sessions, not distinct tasks.
    pub task_count: u64,
    pub avg_session_time: f64,
}

/// Ranks owners by time tracked since Monday 00:00 of the week containing
/// `now`. Owners without an entry this week do not appear. Ties keep the order
/// in which owners were first seen in `entries`.
pub fn leaderboard<Tz: TimeZone>(
    entries: &[TimeEntry],
    users: &[User],
    now: &DateTime<Tz>,
) -> Vec<LeaderboardRow> {
    let week_start = start_of_week(now).with_timezone(&Utc);

    let mut order: Vec<(String, u64, u64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for entry in entries.iter().filter(|entry| entry.start_time >= week_start) {
        match index.get(entry.owner.as_str()) {
            Some(&slot) => {
                order[slot].1 += entry.duration;
                order[slot].2 += 1;
            }
            None => {
                index.insert(entry.owner.as_str(), order.len());
                order.push((entry.owner.clone(), entry.duration, 1));
            }
        }
    }

    let names: HashMap<&str, &str> = users
        .iter()
        .map(|user| (user.identity.as_str(), user.display_name.as_str()))
        .collect();

    let mut rows: Vec<LeaderboardRow> = order
        .into_iter()
        .map(|(owner, total_time, task_count)| LeaderboardRow {
            display_name: names
                .get(owner.as_str())
                .map(|name| name.to_string())
                .unwrap_or_else(|| owner.clone()),
            avg_session_time: total_time as f64 / task_count as f64,
            owner,
            total_time,
            task_count,
        })
        .collect();

    rows.sort_by(|a, b| b.total_time.cmp(&a.total_time));
    rows.truncate(LEADERBOARD_LIMIT);
    rows
}
