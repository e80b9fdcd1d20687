use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::{
    helpers::{format_datetime, parse_datetime, to_i64, to_u64},
    Database,
};
use crate::models::{NewTask, Task, TaskUpdate};

const TASK_COLUMNS: &str = "id, owner, name, description, color, total_time, is_active, created_at";

pub(crate) fn row_to_task(row: &Row) -> Result<Task> {
    let total_time: i64 = row.get("total_time")?;
    let created_at: String = row.get("created_at")?;

    Ok(Task {
        id: row.get("id")?,
        owner: row.get("owner")?,
        name: row.get("name")?,
        description: row.get("description")?,
        color: row.get("color")?,
        total_time: to_u64(total_time, "total_time")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        is_active: row.get("is_active")?,
    })
}

impl Database {
    pub async fn insert_task(&self, owner: &str, input: NewTask) -> Result<Task> {
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
        let record = task.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO tasks (id, owner, name, description, color, total_time, is_active, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id,
                    record.owner,
                    record.name,
                    record.description,
                    record.color,
                    to_i64(record.total_time)?,
                    record.is_active,
                    format_datetime(&record.created_at),
                ],
            )?;
            Ok(())
        })
        .await?;
        Ok(task)
    }

    pub async fn get_tasks_for_owner(&self, owner: &str) -> Result<Vec<Task>> {
        let owner = owner.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS}
                 FROM tasks
                 WHERE owner = ?1
                 ORDER BY created_at DESC"
            ))?;
            let mut rows = stmt.query(params![owner])?;
            let mut tasks = Vec::new();
            while let Some(row) = rows.next()? {
                tasks.push(row_to_task(row)?);
            }
            Ok(tasks)
        })
        .await
    }

    pub async fn find_task(&self, owner: &str, task_id: &str) -> Result<Option<Task>> {
        let owner = owner.to_string();
        let task_id = task_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS}
                 FROM tasks
                 WHERE id = ?1 AND owner = ?2"
            ))?;
            let task = stmt
                .query_row(params![task_id, owner], |row| Ok(row_to_task(row)))
                .optional()?
                .transpose()?;
            Ok(task)
        })
        .await
    }

    pub async fn patch_task(&self, owner: &str, task_id: &str, update: TaskUpdate) -> Result<bool> {
        let owner = owner.to_string();
        let task_id = task_id.to_string();
        self.execute(move |conn| {
            let total_time = update.total_time.map(to_i64).transpose()?;
            let changed = conn.execute(
                "UPDATE tasks
                 SET name = COALESCE(?1, name),
                     description = CASE WHEN ?2 IS NULL THEN description ELSE NULLIF(?2, '') END,
                     color = COALESCE(?3, color),
                     total_time = COALESCE(?4, total_time)
                 WHERE id = ?5 AND owner = ?6",
                params![
                    update.name,
                    update.description,
                    update.color,
                    total_time,
                    task_id,
                    owner,
                ],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    pub async fn remove_task(&self, owner: &str, task_id: &str) -> Result<bool> {
        let owner = owner.to_string();
        let task_id = task_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM timer_states WHERE task_id = ?1",
                params![task_id],
            )?;
            tx.execute(
                "DELETE FROM time_entries WHERE task_id = ?1 AND owner = ?2",
                params![task_id, owner],
            )?;
            let removed = tx.execute(
                "DELETE FROM tasks WHERE id = ?1 AND owner = ?2",
                params![task_id, owner],
            )?;
            tx.commit()?;
            Ok(removed > 0)
        })
        .await
    }

    pub async fn increment_task_time(&self, owner: &str, task_id: &str, secs: u64) -> Result<bool> {
        let owner = owner.to_string();
        let task_id = task_id.to_string();
        self.execute(move |conn| {
            let changed = conn.execute(
                "UPDATE tasks
                 SET total_time = total_time + ?1
                 WHERE id = ?2 AND owner = ?3",
                params![to_i64(secs)?, task_id, owner],
            )?;
            Ok(changed > 0)
        })
        .await
    }
}
