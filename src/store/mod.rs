//! The persistence collaborator consumed by the timer engine and the task service.
//!
//! Two backends implement [`TimeStore`]: the SQLite [`crate::db::Database`] for
//! multi-user mode and [`LocalStore`] (JSON blobs in a directory) for single-user
//! mode. The backend is picked once at start-up and handed around as
//! `Arc<dyn TimeStore>`.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{NewTask, Task, TaskUpdate, TimeEntry, User};
use crate::timer::TimerState;

pub mod local;
#[cfg(test)]
pub mod memory;

pub use local::LocalStore;

#[async_trait]
pub trait TimeStore: Send + Sync {
    async fn upsert_user(&self, user: &User) -> Result<()>;

    async fn resolve_display_name(&self, owner: &str) -> Result<Option<String>>;

    async fn list_users(&self) -> Result<Vec<User>>;

    /// Tasks for `owner`, newest first.
    async fn list_tasks(&self, owner: &str) -> Result<Vec<Task>>;

    async fn get_task(&self, owner: &str, task_id: &str) -> Result<Option<Task>>;

    async fn create_task(&self, owner: &str, input: NewTask) -> Result<Task>;

    /// Returns `false` when no task with that id belongs to `owner`.
    async fn update_task(&self, owner: &str, task_id: &str, update: TaskUpdate) -> Result<bool>;

    /// Deletes the task, its entries and any in-flight timer pointing at it.
    async fn delete_task(&self, owner: &str, task_id: &str) -> Result<bool>;

    /// Adds `secs` to the task's cached total.
    async fn add_task_time(&self, owner: &str, task_id: &str, secs: u64) -> Result<bool>;

    async fn create_time_entry(&self, entry: &TimeEntry) -> Result<()>;

    /// Entries for `owner`, newest first.
    async fn list_time_entries(&self, owner: &str) -> Result<Vec<TimeEntry>>;

    /// Entries of every owner starting at or after `since`.
    async fn list_entries_since(&self, since: DateTime<Utc>) -> Result<Vec<TimeEntry>>;

    async fn load_timer_state(&self, owner: &str) -> Result<Option<TimerState>>;

    async fn save_timer_state(&self, owner: &str, state: &TimerState) -> Result<()>;

    async fn clear_timer_state(&self, owner: &str) -> Result<()>;
}
