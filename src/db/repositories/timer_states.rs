use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    helpers::{format_datetime, parse_optional_datetime, to_i64, to_u64},
    Database,
};
use crate::timer::TimerState;

use super::row_to_task;

fn row_to_timer_state(row: &Row) -> Result<TimerState> {
    let start_time: Option<String> = row.get("start_time")?;
    let elapsed_ms: i64 = row.get("elapsed_ms")?;

    let mut state = TimerState {
        is_running: row.get("is_running")?,
        current_task: Some(row_to_task(row)?),
        start_time: parse_optional_datetime(start_time, "start_time")?,
        elapsed_ms: to_u64(elapsed_ms, "elapsed_ms")?,
    };
    state.normalize();
    Ok(state)
}

impl Database {
    /// The persisted timer for `owner`, with its task re-read so the cached
    /// total reflects any entries recorded since.
    pub async fn get_timer_state(&self, owner: &str) -> Result<Option<TimerState>> {
        let owner = owner.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT ts.is_running, ts.start_time, ts.elapsed_ms,
                        t.id, t.owner, t.name, t.description, t.color, t.total_time,
                        t.is_active, t.created_at
                 FROM timer_states ts
                 JOIN tasks t ON t.id = ts.task_id
                 WHERE ts.owner = ?1",
            )?;
            let state = stmt
                .query_row(params![owner], |row| Ok(row_to_timer_state(row)))
                .optional()?
                .transpose()?;
            Ok(state)
        })
        .await
    }

    pub async fn put_timer_state(&self, owner: &str, state: &TimerState) -> Result<()> {
        let Some(task_id) = state.current_task.as_ref().map(|task| task.id.clone()) else {
            return self.delete_timer_state(owner).await;
        };
        let owner = owner.to_string();
        let record = state.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO timer_states (owner, task_id, is_running, start_time, elapsed_ms, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(owner) DO UPDATE SET
                     task_id = excluded.task_id,
                     is_running = excluded.is_running,
                     start_time = excluded.start_time,
                     elapsed_ms = excluded.elapsed_ms,
                     updated_at = excluded.updated_at",
                params![
                    owner,
                    task_id,
                    record.is_running,
                    record.start_time.as_ref().map(format_datetime),
                    to_i64(record.elapsed_ms)?,
                    format_datetime(&Utc::now()),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn delete_timer_state(&self, owner: &str) -> Result<()> {
        let owner = owner.to_string();
        self.execute(move |conn| {
            conn.execute("DELETE FROM timer_states WHERE owner = ?1", params![owner])?;
            Ok(())
        })
        .await
    }
}
