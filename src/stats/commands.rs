use anyhow::Result;
use chrono::Local;
use prettytable::Table;

use crate::{
    tasks::commands::short_id,
    utils::format::{format_duration, format_time},
    AppState,
};

use super::service::{load_dashboard, weekly_leaderboard};

pub async fn show_stats(state: &AppState) -> Result<()> {
    let now = Local::now();
    let dashboard = load_dashboard(state.store(), state.owner(), &now).await?;
    let summary = &dashboard.summary;

    println!(
        "Today {}  |  This week {}  |  All time {}  |  {} tasks",
        format_duration(summary.today_time),
        format_duration(summary.week_time),
        format_duration(summary.total_time),
        summary.task_count
    );

    if !dashboard.breakdown.is_empty() {
        let mut table = Table::new();
        table.add_row(row!["task", "today", "total", "share"]);
        for line in &dashboard.breakdown {
            table.add_row(row![
                line.name,
                format_duration(line.today_duration),
                format_duration(line.total_duration),
                format!("{:.1}%", line.percentage)
            ]);
        }
        table.printstd();
    }

    let mut week = Table::new();
    week.add_row(row!["day", "total", "tasks"]);
    for day in &dashboard.weekly.daily_breakdown {
        let tasks = day
            .tasks
            .iter()
            .map(|task| format!("{} {}", task.task_name, format_duration(task.time)))
            .collect::<Vec<_>>()
            .join(", ");
        week.add_row(row![
            day.date.format("%a %d %b"),
            format_duration(day.total_time),
            tasks
        ]);
    }
    println!(
        "Week of {}: {}",
        dashboard.weekly.week,
        format_duration(dashboard.weekly.total_time)
    );
    week.printstd();

    if !dashboard.recent.is_empty() {
        println!("Recent activity");
        for entry in &dashboard.recent {
            println!(
                "  {}  {}  {}{}",
                entry.start_time.with_timezone(&Local).format("%H:%M"),
                format_time(entry.duration),
                short_id(&entry.task_id),
                entry
                    .description
                    .as_deref()
                    .map(|note| format!("  {note}"))
                    .unwrap_or_default()
            );
        }
    }

    Ok(())
}

pub async fn show_leaderboard(state: &AppState) -> Result<()> {
    let rows = weekly_leaderboard(state.store(), &Local::now()).await?;
    if rows.is_empty() {
        println!("Nobody has tracked time this week.");
        return Ok(());
    }

    let mut table = Table::new();
    table.add_row(row!["#", "name", "total", "sessions", "avg session"]);
    for (rank, line) in rows.iter().enumerate() {
        table.add_row(row![
            rank + 1,
            line.display_name,
            format_duration(line.total_time),
            line.task_count,
            format_duration(line.avg_session_time.round() as u64)
        ]);
    }
    table.printstd();
    Ok(())
}
