use std::path::Path;

use anyhow::Result;
use prettytable::Table;

use crate::{
    error::{TrackerError, TrackerResult},
    models::{NewTask, Task, TaskUpdate},
    open_store,
    settings::{SettingsStore, StorageMode},
    utils::format::format_duration,
    AppState,
};

use super::service;

/// Picks the task whose id equals `query`, else the single task whose id
/// starts with it.
pub(crate) fn match_task<'a>(tasks: &'a [Task], query: &str) -> TrackerResult<&'a Task> {
    let query = query.trim();
    if let Some(task) = tasks.iter().find(|task| task.id == query) {
        return Ok(task);
    }

    let mut candidates = tasks
        .iter()
        .filter(|task| !query.is_empty() && task.id.starts_with(query));
    match (candidates.next(), candidates.next()) {
        (Some(task), None) => Ok(task),
        (Some(_), Some(_)) => Err(TrackerError::Validation(format!(
            "task id prefix '{query}' is ambiguous"
        ))),
        (None, _) => Err(TrackerError::task_not_found(query)),
    }
}

pub(crate) async fn resolve_task(state: &AppState, query: &str) -> TrackerResult<Task> {
    let tasks = state.store().list_tasks(state.owner()).await?;
    match_task(&tasks, query).cloned()
}

pub async fn init(
    settings_store: &SettingsStore,
    data_dir: &Path,
    storage: Option<StorageMode>,
    owner: Option<String>,
    display_name: Option<String>,
) -> Result<()> {
    let mut settings = settings_store.get();
    if let Some(storage) = storage {
        settings.storage = storage;
    }
    if let Some(owner) = owner {
        settings.owner = owner.trim().to_string();
    }
    if let Some(display_name) = display_name {
        settings.display_name = display_name.trim().to_string();
    }

    let store = open_store(&settings, data_dir)?;
    let user = service::register_user(store.as_ref(), &settings.owner, &settings.display_name).await?;
    settings_store.update(settings.clone())?;

    println!(
        "Tracking as {} ({}) with {:?} storage in {}",
        user.display_name,
        user.identity,
        settings.storage,
        data_dir.display()
    );
    Ok(())
}

pub async fn add_task(
    state: &AppState,
    name: String,
    description: Option<String>,
    color: Option<String>,
) -> Result<()> {
    let task = service::create_task(
        state.store(),
        state.owner(),
        NewTask {
            name,
            description,
            color,
        },
    )
    .await?;
    println!("Created task {} ({})", task.name, task.id);
    Ok(())
}

pub async fn list_tasks(state: &AppState) -> Result<()> {
    let tasks = state.store().list_tasks(state.owner()).await?;
    if tasks.is_empty() {
        println!("No tasks yet. Add one with `timetracker task add <name>`.");
        return Ok(());
    }

    let current = state.timer.state().await.current_task.map(|task| task.id);

    let mut table = Table::new();
    table.add_row(row!["id", "name", "color", "total", "description"]);
    for task in &tasks {
        let marker = if current.as_deref() == Some(task.id.as_str()) {
            "*"
        } else {
            ""
        };
        table.add_row(row![
            format!("{}{marker}", short_id(&task.id)),
            task.name,
            task.color,
            format_duration(task.total_time),
            task.description.as_deref().unwrap_or("")
        ]);
    }
    table.printstd();
    Ok(())
}

pub async fn edit_task(
    state: &AppState,
    query: &str,
    name: Option<String>,
    description: Option<String>,
    color: Option<String>,
) -> Result<()> {
    let update = TaskUpdate {
        name,
        description,
        color,
        total_time: None,
    };
    if update.is_empty() {
        println!("Nothing to change.");
        return Ok(());
    }

    let task = resolve_task(state, query).await?;
    service::update_task(state.store(), state.owner(), &task.id, update).await?;
    println!("Updated task {}", task.id);
    Ok(())
}

pub async fn remove_task(state: &AppState, query: &str) -> Result<()> {
    let task = resolve_task(state, query).await?;

    let in_flight = state
        .timer
        .state()
        .await
        .current_task
        .is_some_and(|current| current.id == task.id);
    if in_flight {
        state.timer.cancel().await;
    }

    service::delete_task(state.store(), state.owner(), &task.id).await?;
    println!("Deleted task {} and its entries", task.name);
    Ok(())
}

pub async fn reconcile_totals(state: &AppState) -> Result<()> {
    let corrections = service::recompute_task_totals(state.store(), state.owner()).await?;
    if corrections.is_empty() {
        println!("All task totals match their entries.");
        return Ok(());
    }

    let mut table = Table::new();
    table.add_row(row!["task", "cached", "from entries"]);
    for correction in &corrections {
        table.add_row(row![
            short_id(&correction.task_id),
            format_duration(correction.previous),
            format_duration(correction.corrected)
        ]);
    }
    table.printstd();
    Ok(())
}

pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
