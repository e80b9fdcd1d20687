use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{NewTask, Task, TaskUpdate, TimeEntry, User};
use crate::store::TimeStore;
use crate::timer::TimerState;

use super::Database;

#[async_trait]
impl TimeStore for Database {
    async fn upsert_user(&self, user: &User) -> Result<()> {
        self.upsert_user_row(user).await
    }

    async fn resolve_display_name(&self, owner: &str) -> Result<Option<String>> {
        self.get_display_name(owner).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.get_users().await
    }

    async fn list_tasks(&self, owner: &str) -> Result<Vec<Task>> {
        self.get_tasks_for_owner(owner).await
    }

    async fn get_task(&self, owner: &str, task_id: &str) -> Result<Option<Task>> {
        self.find_task(owner, task_id).await
    }

    async fn create_task(&self, owner: &str, input: NewTask) -> Result<Task> {
        self.insert_task(owner, input).await
    }

    async fn update_task(&self, owner: &str, task_id: &str, update: TaskUpdate) -> Result<bool> {
        self.patch_task(owner, task_id, update).await
    }

    async fn delete_task(&self, owner: &str, task_id: &str) -> Result<bool> {
        self.remove_task(owner, task_id).await
    }

    async fn add_task_time(&self, owner: &str, task_id: &str, secs: u64) -> Result<bool> {
        self.increment_task_time(owner, task_id, secs).await
    }

    async fn create_time_entry(&self, entry: &TimeEntry) -> Result<()> {
        self.insert_time_entry(entry).await
    }

    async fn list_time_entries(&self, owner: &str) -> Result<Vec<TimeEntry>> {
        self.get_time_entries_for_owner(owner).await
    }

    async fn list_entries_since(&self, since: DateTime<Utc>) -> Result<Vec<TimeEntry>> {
        self.get_time_entries_since(since).await
    }

    async fn load_timer_state(&self, owner: &str) -> Result<Option<TimerState>> {
        self.get_timer_state(owner).await
    }

    async fn save_timer_state(&self, owner: &str, state: &TimerState) -> Result<()> {
        self.put_timer_state(owner, state).await
    }

    async fn clear_timer_state(&self, owner: &str) -> Result<()> {
        self.delete_timer_state(owner).await
    }
}
