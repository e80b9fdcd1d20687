//! Task and user operations with validation on top of a [`TimeStore`].

use chrono::Utc;
use serde::Serialize;

use crate::{
    error::{TrackerError, TrackerResult},
    models::{NewTask, Task, TaskUpdate, User},
    stats::total_for_task,
    store::TimeStore,
};

use super::palette::random_color;

/// A task whose cached total disagreed with its entry log.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TotalCorrection {
    pub task_id: String,
    pub previous: u64,
    pub corrected: u64,
}

fn required(value: &str, field: &str) -> TrackerResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

pub async fn register_user(
    store: &dyn TimeStore,
    identity: &str,
    display_name: &str,
) -> TrackerResult<User> {
    let user = User {
        identity: required(identity, "identity")?,
        display_name: required(display_name, "display name")?,
        created_at: Utc::now(),
    };
    store.upsert_user(&user).await?;
    Ok(user)
}

pub async fn create_task(
    store: &dyn TimeStore,
    owner: &str,
    input: NewTask,
) -> TrackerResult<Task> {
    let input = NewTask {
        name: required(&input.name, "task name")?,
        description: optional_text(input.description),
        color: optional_text(input.color).or_else(|| Some(random_color())),
    };
    let task = store.create_task(owner, input).await?;
    log::info!("Created task {} ({}) for {owner}", task.id, task.name);
    Ok(task)
}

pub async fn update_task(
    store: &dyn TimeStore,
    owner: &str,
    task_id: &str,
    mut update: TaskUpdate,
) -> TrackerResult<()> {
    update.name = update
        .name
        .as_deref()
        .map(|name| required(name, "task name"))
        .transpose()?;
    update.color = update
        .color
        .as_deref()
        .map(|color| required(color, "color"))
        .transpose()?;
    update.description = update
        .description
        .map(|description| description.trim().to_string());
    if update.is_empty() {
        return Err(TrackerError::Validation("nothing to update".into()));
    }

    if !store.update_task(owner, task_id, update).await? {
        return Err(TrackerError::task_not_found(task_id));
    }
    Ok(())
}

/// Deletes the task together with its time entries.
pub async fn delete_task(store: &dyn TimeStore, owner: &str, task_id: &str) -> TrackerResult<()> {
    if !store.delete_task(owner, task_id).await? {
        return Err(TrackerError::task_not_found(task_id));
    }
    log::info!("Deleted task {task_id} for {owner}");
    Ok(())
}

/// Rebuilds every task's cached total from the entry log and returns what
/// changed. Repairs totals left behind by a stop whose second write failed.
pub async fn recompute_task_totals(
    store: &dyn TimeStore,
    owner: &str,
) -> TrackerResult<Vec<TotalCorrection>> {
    let tasks = store.list_tasks(owner).await?;
    let entries = store.list_time_entries(owner).await?;

    let mut corrections = Vec::new();
    for task in tasks {
        let corrected = total_for_task(&entries, &task.id);
        if corrected == task.total_time {
            continue;
        }

        let update = TaskUpdate {
            total_time: Some(corrected),
            ..Default::default()
        };
        if store.update_task(owner, &task.id, update).await? {
            log::warn!(
                "Corrected total of task {} from {}s to {corrected}s",
                task.id,
                task.total_time
            );
            corrections.push(TotalCorrection {
                task_id: task.id,
                previous: task.total_time,
                corrected,
            });
        }
    }

    Ok(corrections)
}
