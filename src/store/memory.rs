//! In-memory store with failure injection, for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{NewTask, Task, TaskUpdate, TimeEntry, User};
use crate::timer::TimerState;

use super::TimeStore;

#[derive(Default)]
struct MemoryData {
    users: Vec<User>,
    tasks: Vec<Task>,
    entries: Vec<TimeEntry>,
    timers: HashMap<String, TimerState>,
}

#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
    fail_writes: AtomicBool,
    fail_task_time: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write fails while set.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Only `add_task_time` fails while set.
    pub fn set_fail_task_time(&self, fail: bool) {
        self.fail_task_time.store(fail, Ordering::SeqCst);
    }

    pub async fn insert_task(&self, task: Task) {
        self.data.write().await.tasks.push(task);
    }

    pub async fn entries(&self) -> Vec<TimeEntry> {
        self.data.read().await.entries.clone()
    }

    fn check_writes(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("store unreachable");
        }
        Ok(())
    }
}

#[async_trait]
impl TimeStore for MemoryStore {
    async fn upsert_user(&self, user: &User) -> Result<()> {
        self.check_writes()?;
        let mut data = self.data.write().await;
        data.users.retain(|existing| existing.identity != user.identity);
        data.users.push(user.clone());
        Ok(())
    }

    async fn resolve_display_name(&self, owner: &str) -> Result<Option<String>> {
        let data = self.data.read().await;
        Ok(data
            .users
            .iter()
            .find(|user| user.identity == owner)
            .map(|user| user.display_name.clone()))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.data.read().await.users.clone())
    }

    async fn list_tasks(&self, owner: &str) -> Result<Vec<Task>> {
        let data = self.data.read().await;
        let mut tasks: Vec<Task> = data
            .tasks
            .iter()
            .filter(|task| task.owner == owner)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn get_task(&self, owner: &str, task_id: &str) -> Result<Option<Task>> {
        let data = self.data.read().await;
        Ok(data
            .tasks
            .iter()
            .find(|task| task.owner == owner && task.id == task_id)
            .cloned())
    }

    async fn create_task(&self, owner: &str, input: NewTask) -> Result<Task> {
        self.check_writes()?;
        let task = Task {
            id: Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            name: input.name,
            description: input.description,
            color: input.color.unwrap_or_default(),
            total_time: 0,
            created_at: Utc::now(),
            is_active: false,
        };
        self.data.write().await.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, owner: &str, task_id: &str, update: TaskUpdate) -> Result<bool> {
        self.check_writes()?;
        let mut data = self.data.write().await;
        match data
            .tasks
            .iter_mut()
            .find(|task| task.owner == owner && task.id == task_id)
        {
            Some(task) => {
                update.apply(task);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_task(&self, owner: &str, task_id: &str) -> Result<bool> {
        self.check_writes()?;
        let mut data = self.data.write().await;
        let before = data.tasks.len();
        data.tasks
            .retain(|task| !(task.owner == owner && task.id == task_id));
        if data.tasks.len() == before {
            return Ok(false);
        }
        data.entries
            .retain(|entry| !(entry.owner == owner && entry.task_id == task_id));
        data.timers.retain(|_, state| {
            state
                .current_task
                .as_ref()
                .map(|task| task.id != task_id)
                .unwrap_or(true)
        });
        Ok(true)
    }

    async fn add_task_time(&self, owner: &str, task_id: &str, secs: u64) -> Result<bool> {
        self.check_writes()?;
        if self.fail_task_time.load(Ordering::SeqCst) {
            bail!("task total update rejected");
        }
        let mut data = self.data.write().await;
        match data
            .tasks
            .iter_mut()
            .find(|task| task.owner == owner && task.id == task_id)
        {
            Some(task) => {
                task.total_time += secs;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_time_entry(&self, entry: &TimeEntry) -> Result<()> {
        self.check_writes()?;
        self.data.write().await.entries.push(entry.clone());
        Ok(())
    }

    async fn list_time_entries(&self, owner: &str) -> Result<Vec<TimeEntry>> {
        let data = self.data.read().await;
        let mut entries: Vec<TimeEntry> = data
            .entries
            .iter()
            .filter(|entry| entry.owner == owner)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(entries)
    }

    async fn list_entries_since(&self, since: DateTime<Utc>) -> Result<Vec<TimeEntry>> {
        let data = self.data.read().await;
        Ok(data
            .entries
            .iter()
            .filter(|entry| entry.start_time >= since)
            .cloned()
            .collect())
    }

    async fn load_timer_state(&self, owner: &str) -> Result<Option<TimerState>> {
        Ok(self.data.read().await.timers.get(owner).cloned())
    }

    async fn save_timer_state(&self, owner: &str, state: &TimerState) -> Result<()> {
        self.check_writes()?;
        self.data
            .write()
            .await
            .timers
            .insert(owner.to_string(), state.clone());
        Ok(())
    }

    async fn clear_timer_state(&self, owner: &str) -> Result<()> {
        self.check_writes()?;
        self.data.write().await.timers.remove(owner);
        Ok(())
    }
}
