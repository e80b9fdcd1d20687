use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::time::Duration;
use uuid::Uuid;

use crate::{
    error::{TrackerError, TrackerResult},
    models::{Task, TimeEntry},
    store::TimeStore,
    utils::format::format_time,
};

use super::{ticker::Ticker, Clock, TimerState, TimerStatus};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Read-only view of the timer handed to the UI/CLI layer.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub status: TimerStatus,
    pub elapsed_secs: u64,
    pub display: String,
}

/// Owns the single in-flight timer of one user.
///
/// Transitions are applied in memory first; store writes that follow are
/// best-effort and only logged on failure, so the timer stays usable when the
/// store is down.
#[derive(Clone)]
pub struct TimerEngine {
    owner: String,
    state: Arc<Mutex<TimerState>>,
    store: Arc<dyn TimeStore>,
    clock: Arc<dyn Clock>,
    ticker: Arc<Mutex<Ticker>>,
    tick_interval: Duration,
    elapsed_tx: Arc<watch::Sender<u64>>,
}

impl TimerEngine {
    pub fn new(
        owner: impl Into<String>,
        store: Arc<dyn TimeStore>,
        clock: Arc<dyn Clock>,
        tick_interval: Duration,
    ) -> Self {
        let (elapsed_tx, _) = watch::channel(0);
        Self {
            owner: owner.into(),
            state: Arc::new(Mutex::new(TimerState::new())),
            store,
            clock,
            ticker: Arc::new(Mutex::new(Ticker::new())),
            tick_interval,
            elapsed_tx: Arc::new(elapsed_tx),
        }
    }

    /// Builds an engine and rehydrates any timer persisted for `owner`.
    pub async fn restore(
        owner: impl Into<String>,
        store: Arc<dyn TimeStore>,
        clock: Arc<dyn Clock>,
        tick_interval: Duration,
    ) -> Self {
        let engine = Self::new(owner, store, clock, tick_interval);

        let persisted = match engine.store.load_timer_state(&engine.owner).await {
            Ok(persisted) => persisted,
            Err(err) => {
                log_error!("Failed to load timer state for {}: {err:#}", engine.owner);
                None
            }
        };

        let Some(mut restored) = persisted else {
            return engine;
        };
        restored.normalize();

        let task_id = match &restored.current_task {
            Some(task) => task.id.clone(),
            None => return engine,
        };

        match engine.store.get_task(&engine.owner, &task_id).await {
            Ok(Some(task)) => {
                restored.current_task = Some(task);
            }
            Ok(None) => {
                log_warn!("Discarding in-flight timer for deleted task {task_id}");
                engine.clear_persisted().await;
                return engine;
            }
            Err(err) => {
                // Keep the snapshot's copy of the task.
                log_error!("Failed to refresh task {task_id} for restored timer: {err:#}");
            }
        }

        let now = engine.clock.now();
        restored.sync_elapsed(now);
        let status = restored.status();
        engine.elapsed_tx.send_replace(restored.elapsed_secs());
        *engine.state.lock().await = restored;

        if status == TimerStatus::Running {
            engine.spawn_ticker().await;
        }

        log_info!(
            "Restored {} timer for {} on task {task_id}",
            status.as_str(),
            engine.owner
        );
        engine
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub async fn state(&self) -> TimerState {
        let mut guard = self.state.lock().await;
        guard.sync_elapsed(self.clock.now());
        guard.clone()
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        let state = self.state().await;
        let elapsed_secs = state.elapsed_secs();
        TimerSnapshot {
            status: state.status(),
            elapsed_secs,
            display: format_time(elapsed_secs),
            state,
        }
    }

    /// Elapsed seconds, published once per tick while running and on every
    /// transition.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.elapsed_tx.subscribe()
    }

    pub async fn is_ticking(&self) -> bool {
        self.ticker.lock().await.is_active()
    }

    /// Idle -> Running on `task_id`. Refused while another task is current.
    pub async fn start(&self, task_id: &str) -> TrackerResult<TimerSnapshot> {
        self.ensure_idle().await?;
        let task = self.load_task(task_id).await?;

        let state = {
            let mut guard = self.state.lock().await;
            if !guard.begin(task, self.clock.now()) {
                return Err(self.conflict(&guard));
            }
            guard.clone()
        };

        self.persist(&state).await;
        self.elapsed_tx.send_replace(0);
        self.spawn_ticker().await;

        log_info!("Timer started for {} on task {task_id}", self.owner);
        Ok(self.snapshot().await)
    }

    /// The confirmed "stop the current session, then start another" path.
    pub async fn switch_to(
        &self,
        task_id: &str,
    ) -> TrackerResult<(Option<TimeEntry>, TimerSnapshot)> {
        // Validate the target first so a bad id never ends the current session.
        self.load_task(task_id).await?;
        let finished = self.stop().await;
        let snapshot = self.start(task_id).await?;
        Ok((finished, snapshot))
    }

    /// Running -> Paused. A no-op in any other state.
    pub async fn pause(&self) -> TimerSnapshot {
        let paused = {
            let mut guard = self.state.lock().await;
            if guard.pause(self.clock.now()) {
                Some(guard.clone())
            } else {
                None
            }
        };

        if let Some(state) = paused {
            self.cancel_ticker().await;
            self.elapsed_tx.send_replace(state.elapsed_secs());
            self.persist(&state).await;
            log_info!(
                "Timer paused for {} at {}s",
                self.owner,
                state.elapsed_secs()
            );
        }

        self.snapshot().await
    }

    /// Paused -> Running. A no-op in any other state.
    pub async fn resume(&self) -> TimerSnapshot {
        let resumed = {
            let mut guard = self.state.lock().await;
            if guard.resume(self.clock.now()) {
                Some(guard.clone())
            } else {
                None
            }
        };

        if let Some(state) = resumed {
            self.persist(&state).await;
            self.spawn_ticker().await;
            log_info!("Timer resumed for {}", self.owner);
        }

        self.snapshot().await
    }

    pub async fn stop(&self) -> Option<TimeEntry> {
        self.stop_with_description(None).await
    }

    /// Running|Paused -> Idle, emitting the completed entry. `None` from Idle.
    pub async fn stop_with_description(&self, description: Option<String>) -> Option<TimeEntry> {
        let finished = {
            let mut guard = self.state.lock().await;
            guard.finish(self.clock.now())
        }?;

        self.cancel_ticker().await;
        self.elapsed_tx.send_replace(0);

        let entry = TimeEntry {
            id: Uuid::new_v4().to_string(),
            task_id: finished.task.id.clone(),
            owner: self.owner.clone(),
            start_time: finished.start_time,
            end_time: Some(finished.end_time),
            duration: finished.duration,
            description,
        };

        self.record_entry(&entry).await;
        self.clear_persisted().await;

        log_info!(
            "Timer stopped for {} on task {} after {}s",
            self.owner,
            entry.task_id,
            entry.duration
        );
        Some(entry)
    }

    /// Drops the in-flight timer without emitting an entry.
    pub async fn cancel(&self) -> bool {
        let was_active = {
            let mut guard = self.state.lock().await;
            let active = guard.status() != TimerStatus::Idle;
            guard.reset();
            active
        };

        if was_active {
            self.cancel_ticker().await;
            self.elapsed_tx.send_replace(0);
            self.clear_persisted().await;
            log_info!("Timer cancelled for {}", self.owner);
        }
        was_active
    }

    /// Tears the ticker down; the in-flight state is left for `restore`.
    pub async fn shutdown(&self) {
        self.cancel_ticker().await;
    }

    async fn ensure_idle(&self) -> TrackerResult<()> {
        let guard = self.state.lock().await;
        if guard.status() != TimerStatus::Idle {
            return Err(self.conflict(&guard));
        }
        Ok(())
    }

    fn conflict(&self, state: &TimerState) -> TrackerError {
        let current = state
            .current_task
            .as_ref()
            .map(|task| task.name.as_str())
            .unwrap_or("another task");
        TrackerError::Conflict(format!(
            "a timer is already {} for '{current}'; stop it or switch explicitly",
            state.status().as_str().to_lowercase()
        ))
    }

    async fn load_task(&self, task_id: &str) -> TrackerResult<Task> {
        self.store
            .get_task(&self.owner, task_id)
            .await?
            .ok_or_else(|| TrackerError::task_not_found(task_id))
    }

    /// Appends the entry, then bumps the task total. The two writes are not
    /// atomic; `recompute_task_totals` repairs a total left behind.
    async fn record_entry(&self, entry: &TimeEntry) {
        if let Err(err) = self.store.create_time_entry(entry).await {
            log_error!("Failed to save time entry {}: {err:#}", entry.id);
            return;
        }

        match self
            .store
            .add_task_time(&self.owner, &entry.task_id, entry.duration)
            .await
        {
            Ok(true) => {}
            Ok(false) => log_warn!(
                "Task {} vanished before its total could be updated",
                entry.task_id
            ),
            Err(err) => log_error!(
                "Failed to add {}s to task {}: {err:#}",
                entry.duration,
                entry.task_id
            ),
        }
    }

    async fn persist(&self, state: &TimerState) {
        let result = if state.status() == TimerStatus::Idle {
            self.store.clear_timer_state(&self.owner).await
        } else {
            self.store.save_timer_state(&self.owner, state).await
        };

        if let Err(err) = result {
            log_error!("Failed to persist timer state for {}: {err:#}", self.owner);
        }
    }

    async fn clear_persisted(&self) {
        if let Err(err) = self.store.clear_timer_state(&self.owner).await {
            log_error!("Failed to clear timer state for {}: {err:#}", self.owner);
        }
    }

    async fn spawn_ticker(&self) {
        self.ticker
            .lock()
            .await
            .start(
                self.state.clone(),
                self.clock.clone(),
                self.elapsed_tx.clone(),
                self.tick_interval,
            )
            .await;
    }

    async fn cancel_ticker(&self) {
        if let Err(err) = self.ticker.lock().await.stop().await {
            log_warn!("Tick loop did not stop cleanly: {err:#}");
        }
    }
}
