//! Pure folds over tasks and time entries for the dashboard.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::models::{Task, TimeEntry};

use super::calendar::{start_of_day, start_of_next_day, start_of_week};

/// Per-task line of the dashboard breakdown.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskBreakdown {
    pub task_id: String,
    pub name: String,
    pub color: String,
    pub total_duration: u64,
    pub today_duration: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub today_time: u64,
    pub week_time: u64,
    pub total_time: u64,
    pub task_count: usize,
}

pub fn total_for(entries: &[TimeEntry]) -> u64 {
    entries.iter().map(|entry| entry.duration).sum()
}

pub fn entries_for_task(entries: &[TimeEntry], task_id: &str) -> Vec<TimeEntry> {
    entries
        .iter()
        .filter(|entry| entry.task_id == task_id)
        .cloned()
        .collect()
}

pub fn total_for_task(entries: &[TimeEntry], task_id: &str) -> u64 {
    entries
        .iter()
        .filter(|entry| entry.task_id == task_id)
        .map(|entry| entry.duration)
        .sum()
}

/// Entries whose start falls on the local calendar day of `now`.
pub fn today_entries<Tz: TimeZone>(entries: &[TimeEntry], now: &DateTime<Tz>) -> Vec<TimeEntry> {
    let start = start_of_day(now).with_timezone(&Utc);
    let end = start_of_next_day(now).with_timezone(&Utc);
    entries
        .iter()
        .filter(|entry| entry.start_time >= start && entry.start_time < end)
        .cloned()
        .collect()
}

/// Entries starting on or after Monday 00:00 of the week containing `now`.
pub fn week_entries<Tz: TimeZone>(entries: &[TimeEntry], now: &DateTime<Tz>) -> Vec<TimeEntry> {
    let start = start_of_week(now).with_timezone(&Utc);
    entries
        .iter()
        .filter(|entry| entry.start_time >= start)
        .cloned()
        .collect()
}

/// One line per task, largest total first. Percentages are of the summed task
/// totals and are all zero when nothing has been tracked.
pub fn per_task_breakdown(
    tasks: &[Task],
    entries: &[TimeEntry],
    today: &[TimeEntry],
) -> Vec<TaskBreakdown> {
    let mut rows: Vec<TaskBreakdown> = tasks
        .iter()
        .map(|task| TaskBreakdown {
            task_id: task.id.clone(),
            name: task.name.clone(),
            color: task.color.clone(),
            total_duration: total_for_task(entries, &task.id),
            today_duration: total_for_task(today, &task.id),
            percentage: 0.0,
        })
        .collect();

    let grand_total: u64 = rows.iter().map(|row| row.total_duration).sum();
    if grand_total > 0 {
        for row in &mut rows {
            row.percentage = row.total_duration as f64 / grand_total as f64 * 100.0;
        }
    }

    rows.sort_by(|a, b| b.total_duration.cmp(&a.total_duration));
    rows
}

pub fn dashboard_summary<Tz: TimeZone>(
    tasks: &[Task],
    entries: &[TimeEntry],
    now: &DateTime<Tz>,
) -> DashboardSummary {
    DashboardSummary {
        today_time: total_for(&today_entries(entries, now)),
        week_time: total_for(&week_entries(entries, now)),
        total_time: total_for(entries),
        task_count: tasks.len(),
    }
}

/// The `limit` most recent of today's entries, newest first.
pub fn recent_activity(today: &[TimeEntry], limit: usize) -> Vec<TimeEntry> {
    let mut recent = today.to_vec();
    recent.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    recent.truncate(limit);
    recent
}
