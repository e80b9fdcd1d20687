use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::db::{
    helpers::{format_datetime, parse_datetime, parse_optional_datetime, to_i64, to_u64},
    Database,
};
use crate::models::TimeEntry;

fn row_to_entry(row: &Row) -> Result<TimeEntry> {
    let start_time: String = row.get("start_time")?;
    let end_time: Option<String> = row.get("end_time")?;
    let duration: i64 = row.get("duration")?;

    Ok(TimeEntry {
        id: row.get("id")?,
        task_id: row.get("task_id")?,
        owner: row.get("owner")?,
        start_time: parse_datetime(&start_time, "start_time")?,
        end_time: parse_optional_datetime(end_time, "end_time")?,
        duration: to_u64(duration, "duration")?,
        description: row.get("description")?,
    })
}

impl Database {
    pub async fn insert_time_entry(&self, entry: &TimeEntry) -> Result<()> {
        let record = entry.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO time_entries (id, task_id, owner, start_time, end_time, duration, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.id,
                    record.task_id,
                    record.owner,
                    format_datetime(&record.start_time),
                    record.end_time.as_ref().map(format_datetime),
                    to_i64(record.duration)?,
                    record.description,
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_time_entries_for_owner(&self, owner: &str) -> Result<Vec<TimeEntry>> {
        let owner = owner.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, task_id, owner, start_time, end_time, duration, description
                 FROM time_entries
                 WHERE owner = ?1
                 ORDER BY start_time DESC",
            )?;
            let mut rows = stmt.query(params![owner])?;
            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                entries.push(row_to_entry(row)?);
            }
            Ok(entries)
        })
        .await
    }

    pub async fn get_time_entries_since(&self, since: DateTime<Utc>) -> Result<Vec<TimeEntry>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, task_id, owner, start_time, end_time, duration, description
                 FROM time_entries
                 WHERE start_time >= ?1
                 ORDER BY start_time ASC",
            )?;
            let mut rows = stmt.query(params![format_datetime(&since)])?;
            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                entries.push(row_to_entry(row)?);
            }
            Ok(entries)
        })
        .await
    }
}
