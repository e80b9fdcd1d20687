use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::models::{Task, TimeEntry};

use super::calendar::{local_midnight, week_start_date};

const DAYS_PER_WEEK: i64 = 7;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyTaskTime {
    pub task_id: String,
    pub task_name: String,
    pub time: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: NaiveDate,
    pub total_time: u64,
    /// Tasks with time on this day, largest first.
    pub tasks: Vec<DailyTaskTime>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    /// Monday of the week.
    pub week: NaiveDate,
    pub total_time: u64,
    pub daily_breakdown: Vec<DailyStats>,
}

/// Monday-to-Sunday breakdown of the week containing `now`.
pub fn weekly_stats<Tz: TimeZone>(
    tasks: &[Task],
    entries: &[TimeEntry],
    now: &DateTime<Tz>,
) -> WeeklyStats {
    let tz = now.timezone();
    let monday = week_start_date(now);

    let daily_breakdown: Vec<DailyStats> = (0..DAYS_PER_WEEK)
        .map(|offset| {
            let date = monday + Duration::days(offset);
            let start = local_midnight(&tz, date).with_timezone(&Utc);
            let end = local_midnight(&tz, date + Duration::days(1)).with_timezone(&Utc);
            daily_stats(tasks, entries, date, start, end)
        })
        .collect();

    WeeklyStats {
        week: monday,
        total_time: daily_breakdown.iter().map(|day| day.total_time).sum(),
        daily_breakdown,
    }
}

fn daily_stats(
    tasks: &[Task],
    entries: &[TimeEntry],
    date: NaiveDate,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> DailyStats {
    let day_entries: Vec<&TimeEntry> = entries
        .iter()
        .filter(|entry| entry.start_time >= start && entry.start_time < end)
        .collect();

    let mut per_task: Vec<DailyTaskTime> = Vec::new();
    for entry in &day_entries {
        match per_task.iter_mut().find(|row| row.task_id == entry.task_id) {
            Some(row) => row.time += entry.duration,
            None => per_task.push(DailyTaskTime {
                task_id: entry.task_id.clone(),
                task_name: tasks
                    .iter()
                    .find(|task| task.id == entry.task_id)
                    .map(|task| task.name.clone())
                    .unwrap_or_else(|| entry.task_id.clone()),
                time: entry.duration,
            }),
        }
    }
    per_task.retain(|row| row.time > 0);
    per_task.sort_by(|a, b| b.time.cmp(&a.time));

    DailyStats {
        date,
        total_time: day_entries.iter().map(|entry| entry.duration).sum(),
        tasks: per_task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn entry(task_id: &str, start: DateTime<Utc>, duration: u64) -> TimeEntry {
        TimeEntry {
            id: format!("{task_id}-{}", start.timestamp()),
            task_id: task_id.into(),
            owner: "alice@example.com".into(),
            start_time: start,
            end_time: None,
            duration,
            description: None,
        }
    }

    fn task(id: &str, name: &str) -> Task {
        Task {
            id: id.into(),
            owner: "alice@example.com".into(),
            name: name.into(),
            description: None,
            color: "#84CC16".into(),
            total_time: 0,
            created_at: at(1, 0),
            is_active: false,
        }
    }

    #[test]
    fn seven_days_from_monday() {
        let tasks = vec![task("a", "Alpha"), task("b", "Beta")];
        let entries = vec![
            entry("a", at(4, 9), 600),
            entry("b", at(4, 10), 1200),
            entry("a", at(4, 11), 100),
            entry("b", at(10, 22), 300),  // Sunday
            entry("a", at(11, 9), 999),   // next Monday
            entry("a", at(3, 9), 999),    // previous Sunday
        ];

        let stats = weekly_stats(&tasks, &entries, &at(6, 12));
        assert_eq!(stats.week, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(stats.daily_breakdown.len(), 7);
        assert_eq!(stats.total_time, 2200);

        let monday = &stats.daily_breakdown[0];
        assert_eq!(monday.total_time, 1900);
        assert_eq!(monday.tasks[0].task_name, "Beta");
        assert_eq!(monday.tasks[1].time, 700);

        assert_eq!(stats.daily_breakdown[6].total_time, 300);
        assert!(stats.daily_breakdown[2].tasks.is_empty());
    }
}
