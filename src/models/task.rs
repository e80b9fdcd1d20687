//! Task-related data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named activity a user tracks time against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub owner: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    /// Accumulated duration of every completed entry, in whole seconds.
    pub total_time: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_active: bool,
}

/// Input data for creating a task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// Partial update of a task. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    pub name: Option<String>,
    /// An empty string clears the description.
    pub description: Option<String>,
    pub color: Option<String>,
    /// Overwrites the cached total; only used by reconciliation.
    pub total_time: Option<u64>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.color.is_none()
            && self.total_time.is_none()
    }

    pub fn apply(&self, task: &mut Task) {
        if let Some(name) = &self.name {
            task.name = name.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone()).filter(|text| !text.is_empty());
        }
        if let Some(color) = &self.color {
            task.color = color.clone();
        }
        if let Some(total_time) = self.total_time {
            task.total_time = total_time;
        }
    }
}
