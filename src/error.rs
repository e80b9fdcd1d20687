use thiserror::Error;

/// Failures surfaced by the task service and the timer engine.
///
/// None of these are fatal: every variant leaves the timer in exactly one of
/// Idle, Running or Paused.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("persistence failed: {0:#}")]
    Persistence(#[from] anyhow::Error),
}

impl TrackerError {
    pub fn task_not_found(id: impl Into<String>) -> Self {
        TrackerError::NotFound {
            entity: "task",
            id: id.into(),
        }
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;
