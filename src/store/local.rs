//! Single-user storage: three JSON blobs in one directory.
//!
//! Each blob is read once at open time and cached; every write rewrites the
//! affected blob whole. The timer blob exists only while a timer is in flight.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{NewTask, Task, TaskUpdate, TimeEntry, User};
use crate::timer::TimerState;
use crate::{log_debug, log_warn};

use super::TimeStore;

const ENABLE_LOGS: bool = true;

pub const TASKS_FILE: &str = "timetracker_tasks.json";
pub const ENTRIES_FILE: &str = "timetracker_entries.json";
pub const TIMER_STATE_FILE: &str = "timetracker_timer_state.json";

struct LocalData {
    user: User,
    tasks: Vec<Task>,
    entries: Vec<TimeEntry>,
    timer: Option<TimerState>,
}

pub struct LocalStore {
    dir: PathBuf,
    data: RwLock<LocalData>,
}

impl LocalStore {
    pub fn open(dir: PathBuf, owner: &str, display_name: &str) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create data directory {}", dir.display()))?;

        let tasks = read_blob::<Vec<Task>>(&dir.join(TASKS_FILE)).unwrap_or_default();
        let entries = read_blob::<Vec<TimeEntry>>(&dir.join(ENTRIES_FILE)).unwrap_or_default();
        let timer = read_blob::<TimerState>(&dir.join(TIMER_STATE_FILE)).map(|mut state| {
            state.normalize();
            state
        });

        log_debug!(
            "Local store opened at {} ({} tasks, {} entries)",
            dir.display(),
            tasks.len(),
            entries.len()
        );

        Ok(Self {
            dir,
            data: RwLock::new(LocalData {
                user: User {
                    identity: owner.to_string(),
                    display_name: display_name.to_string(),
                    created_at: Utc::now(),
                },
                tasks,
                entries,
                timer,
            }),
        })
    }

    async fn write_blob<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.dir.join(file);
        let serialized = serde_json::to_string_pretty(value)
            .with_context(|| format!("failed to serialize {file}"))?;
        tokio::fs::write(&path, serialized)
            .await
            .with_context(|| format!("failed to write {}", path.display()))
    }

    async fn remove_blob(&self, file: &str) -> Result<()> {
        let path = self.dir.join(file);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(anyhow::Error::new(err).context(format!("failed to remove {}", path.display())))
            }
        }
    }

    fn owns(data: &LocalData, owner: &str) -> bool {
        data.user.identity == owner
    }
}

/// `None` when the blob is absent or unreadable; both cases read as empty.
fn read_blob<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            log_debug!("{} not present, starting empty", path.display());
            return None;
        }
        Err(err) => {
            log_warn!("Failed to read {}: {err}", path.display());
            return None;
        }
    };

    match serde_json::from_str(&contents) {
        Ok(value) => Some(value),
        Err(err) => {
            log_warn!("Ignoring corrupt {}: {err}", path.display());
            None
        }
    }
}

#[async_trait]
impl TimeStore for LocalStore {
    async fn upsert_user(&self, user: &User) -> Result<()> {
        let mut data = self.data.write().await;
        if Self::owns(&data, &user.identity) {
            data.user.display_name = user.display_name.clone();
        } else {
            log_warn!(
                "Local storage is single-user; ignoring registration of {}",
                user.identity
            );
        }
        Ok(())
    }

    async fn resolve_display_name(&self, owner: &str) -> Result<Option<String>> {
        let data = self.data.read().await;
        Ok(Self::owns(&data, owner).then(|| data.user.display_name.clone()))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(vec![self.data.read().await.user.clone()])
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

        let mut data = self.data.write().await;
        let mut tasks = data.tasks.clone();
        tasks.push(task.clone());
        self.write_blob(TASKS_FILE, &tasks).await?;
        data.tasks = tasks;
        Ok(task)
    }

    async fn update_task(&self, owner: &str, task_id: &str, update: TaskUpdate) -> Result<bool> {
        let mut data = self.data.write().await;
        let mut tasks = data.tasks.clone();
        let Some(task) = tasks
            .iter_mut()
            .find(|task| task.owner == owner && task.id == task_id)
        else {
            return Ok(false);
        };
        update.apply(task);
        self.write_blob(TASKS_FILE, &tasks).await?;
        data.tasks = tasks;
        Ok(true)
    }

    /// Blobs are rewritten tasks first, then entries, then the timer; the
    /// cache only takes each change once its blob is on disk.
    async fn delete_task(&self, owner: &str, task_id: &str) -> Result<bool> {
        let mut data = self.data.write().await;
        let tasks: Vec<Task> = data
            .tasks
            .iter()
            .filter(|task| !(task.owner == owner && task.id == task_id))
            .cloned()
            .collect();
        if tasks.len() == data.tasks.len() {
            return Ok(false);
        }
        self.write_blob(TASKS_FILE, &tasks).await?;
        data.tasks = tasks;

        let entries: Vec<TimeEntry> = data
            .entries
            .iter()
            .filter(|entry| !(entry.owner == owner && entry.task_id == task_id))
            .cloned()
            .collect();
        if entries.len() != data.entries.len() {
            self.write_blob(ENTRIES_FILE, &entries).await?;
            data.entries = entries;
        }

        let timer_on_task = data
            .timer
            .as_ref()
            .and_then(|state| state.current_task.as_ref())
            .is_some_and(|task| task.id == task_id);
        if timer_on_task {
            self.remove_blob(TIMER_STATE_FILE).await?;
            data.timer = None;
        }
        Ok(true)
    }

    async fn add_task_time(&self, owner: &str, task_id: &str, secs: u64) -> Result<bool> {
        let mut data = self.data.write().await;
        let mut tasks = data.tasks.clone();
        let Some(task) = tasks
            .iter_mut()
            .find(|task| task.owner == owner && task.id == task_id)
        else {
            return Ok(false);
        };
        task.total_time = task.total_time.saturating_add(secs);
        self.write_blob(TASKS_FILE, &tasks).await?;
        data.tasks = tasks;
        Ok(true)
    }

    async fn create_time_entry(&self, entry: &TimeEntry) -> Result<()> {
        let mut data = self.data.write().await;
        let mut entries = data.entries.clone();
        entries.push(entry.clone());
        self.write_blob(ENTRIES_FILE, &entries).await?;
        data.entries = entries;
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
        let mut entries: Vec<TimeEntry> = data
            .entries
            .iter()
            .filter(|entry| entry.start_time >= since)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(entries)
    }

    async fn load_timer_state(&self, owner: &str) -> Result<Option<TimerState>> {
        let data = self.data.read().await;
        if !Self::owns(&data, owner) {
            return Ok(None);
        }
        Ok(data.timer.clone())
    }

    async fn save_timer_state(&self, owner: &str, state: &TimerState) -> Result<()> {
        if state.current_task.is_none() {
            return self.clear_timer_state(owner).await;
        }
        let mut data = self.data.write().await;
        if !Self::owns(&data, owner) {
            bail!(
                "local storage belongs to {}; cannot save a timer for {owner}",
                data.user.identity
            );
        }
        self.write_blob(TIMER_STATE_FILE, state).await?;
        data.timer = Some(state.clone());
        Ok(())
    }

    async fn clear_timer_state(&self, owner: &str) -> Result<()> {
        let mut data = self.data.write().await;
        if !Self::owns(&data, owner) {
            return Ok(());
        }
        self.remove_blob(TIMER_STATE_FILE).await?;
        data.timer = None;
        Ok(())
    }
}
