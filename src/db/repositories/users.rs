use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    helpers::{format_datetime, parse_datetime},
    Database,
};
use crate::models::User;

fn row_to_user(row: &Row) -> Result<User> {
    let created_at: String = row.get("created_at")?;

    Ok(User {
        identity: row.get("identity")?,
        display_name: row.get("display_name")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    /// Inserts the user or refreshes its display name. `created_at` is kept
    /// from the first registration.
    pub async fn upsert_user_row(&self, user: &User) -> Result<()> {
        let record = user.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO users (identity, display_name, created_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(identity) DO UPDATE SET display_name = excluded.display_name",
                params![
                    record.identity,
                    record.display_name,
                    format_datetime(&record.created_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_display_name(&self, identity: &str) -> Result<Option<String>> {
        let identity = identity.to_string();
        self.execute(move |conn| {
            let name = conn
                .query_row(
                    "SELECT display_name FROM users WHERE identity = ?1",
                    params![identity],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(name)
        })
        .await
    }

    pub async fn get_users(&self) -> Result<Vec<User>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT identity, display_name, created_at
                 FROM users
                 ORDER BY created_at ASC",
            )?;
            let mut rows = stmt.query([])?;
            let mut users = Vec::new();
            while let Some(row) = rows.next()? {
                users.push(row_to_user(row)?);
            }
            Ok(users)
        })
        .await
    }
}
