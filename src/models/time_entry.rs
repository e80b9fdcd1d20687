//! Completed tracking sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed tracking session. Never mutated once written.
///
/// `duration` is derived once at stop time and frozen; it is not recomputed from
/// `start_time`/`end_time` afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: String,
    pub task_id: String,
    pub owner: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Whole seconds.
    pub duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
