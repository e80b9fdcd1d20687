use std::io::Write;

use anyhow::Result;

use crate::{
    models::TimeEntry,
    tasks::commands::resolve_task,
    utils::format::{format_duration, format_time},
    AppState,
};

use super::{TimerSnapshot, TimerStatus};

fn describe(snapshot: &TimerSnapshot) -> String {
    match &snapshot.state.current_task {
        Some(task) => format!(
            "{} {} on {}",
            snapshot.status.as_str(),
            snapshot.display,
            task.name
        ),
        None => TimerStatus::Idle.as_str().to_string(),
    }
}

fn report_entry(entry: &TimeEntry) {
    println!(
        "Recorded {} ({}s) on task {}",
        format_duration(entry.duration),
        entry.duration,
        entry.task_id
    );
}

pub async fn start_timer(state: &AppState, query: &str, switch: bool) -> Result<()> {
    let task = resolve_task(state, query).await?;

    let snapshot = if switch {
        let (finished, snapshot) = state.timer.switch_to(&task.id).await?;
        if let Some(entry) = finished {
            report_entry(&entry);
        }
        snapshot
    } else {
        state.timer.start(&task.id).await?
    };

    println!("{}", describe(&snapshot));
    Ok(())
}

pub async fn pause_timer(state: &AppState) -> Result<()> {
    let snapshot = state.timer.pause().await;
    println!("{}", describe(&snapshot));
    Ok(())
}

pub async fn resume_timer(state: &AppState) -> Result<()> {
    let snapshot = state.timer.resume().await;
    println!("{}", describe(&snapshot));
    Ok(())
}

pub async fn stop_timer(state: &AppState, note: Option<String>) -> Result<()> {
    let note = note
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());

    match state.timer.stop_with_description(note).await {
        Some(entry) => report_entry(&entry),
        None => println!("No timer to stop."),
    }
    Ok(())
}

pub async fn cancel_timer(state: &AppState) -> Result<()> {
    if state.timer.cancel().await {
        println!("Timer discarded.");
    } else {
        println!("No timer to cancel.");
    }
    Ok(())
}

pub async fn show_status(state: &AppState, follow: bool) -> Result<()> {
    let snapshot = state.timer.snapshot().await;
    if !follow || snapshot.status != TimerStatus::Running {
        println!("{}", describe(&snapshot));
        return Ok(());
    }

    let task_name = snapshot
        .state
        .current_task
        .as_ref()
        .map(|task| task.name.clone())
        .unwrap_or_default();
    let mut elapsed = state.timer.subscribe();
    let mut stdout = std::io::stdout();

    loop {
        let secs = *elapsed.borrow_and_update();
        write!(stdout, "\r{} {task_name}   ", format_time(secs))?;
        stdout.flush()?;

        tokio::select! {
            changed = elapsed.changed() => {
                if changed.is_err() || !state.timer.is_ticking().await {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    writeln!(stdout)?;
    Ok(())
}
