use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner identity plus the name shown on the leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub identity: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}
