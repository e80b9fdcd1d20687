use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Task;

/// The three timer states. Derived from `is_running` + `current_task`; never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

impl TimerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Idle => "Idle",
            TimerStatus::Running => "Running",
            TimerStatus::Paused => "Paused",
        }
    }
}

/// The single in-flight timer of one user.
///
/// Invariants: `current_task` is set unless idle, `start_time` is set iff
/// `is_running`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub is_running: bool,
    pub current_task: Option<Task>,
    /// Anchor of the current running window. Already shifted back by any time
    /// accumulated before the last resume.
    pub start_time: Option<DateTime<Utc>>,
    /// Running time up to the last sync. Kept in milliseconds so repeated
    /// pause/resume cycles do not lose the sub-second remainder.
    pub elapsed_ms: u64,
}

/// What `finish` hands back so the controller can mint a `TimeEntry`.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedRun {
    pub task: Task,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Whole seconds, truncated.
    pub duration: u64,
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> TimerStatus {
        match (&self.current_task, self.is_running) {
            (None, _) => TimerStatus::Idle,
            (Some(_), true) => TimerStatus::Running,
            (Some(_), false) => TimerStatus::Paused,
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_ms / 1000
    }

    pub fn current_elapsed_ms(&self, now: DateTime<Utc>) -> u64 {
        match (self.status(), self.start_time) {
            (TimerStatus::Running, Some(anchor)) => ms_between(anchor, now),
            _ => self.elapsed_ms,
        }
    }

    pub fn sync_elapsed(&mut self, now: DateTime<Utc>) {
        self.elapsed_ms = self.current_elapsed_ms(now);
    }

    /// Idle -> Running. Returns `false` (and leaves the state alone) otherwise.
    pub fn begin(&mut self, task: Task, now: DateTime<Utc>) -> bool {
        if self.status() != TimerStatus::Idle {
            return false;
        }

        *self = Self {
            is_running: true,
            current_task: Some(task),
            start_time: Some(now),
            elapsed_ms: 0,
        };
        true
    }

    /// Running -> Paused.
    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        if self.status() != TimerStatus::Running {
            return false;
        }

        self.sync_elapsed(now);
        self.is_running = false;
        self.start_time = None;
        true
    }

    /// Paused -> Running, with a fresh anchor of `now - elapsed`.
    pub fn resume(&mut self, now: DateTime<Utc>) -> bool {
        if self.status() != TimerStatus::Paused {
            return false;
        }

        self.start_time = Some(anchor_for(now, self.elapsed_ms));
        self.is_running = true;
        true
    }

    /// Running|Paused -> Idle, returning the completed run. `None` from Idle.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Option<FinishedRun> {
        if self.status() == TimerStatus::Idle {
            return None;
        }

        self.sync_elapsed(now);
        let task = self.current_task.take()?;
        let elapsed_ms = self.elapsed_ms;
        self.reset();

        Some(FinishedRun {
            task,
            start_time: anchor_for(now, elapsed_ms),
            end_time: now,
            duration: elapsed_ms / 1000,
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Repairs a rehydrated snapshot so it satisfies the two-field encoding.
    pub fn normalize(&mut self) {
        if self.current_task.is_none() {
            self.reset();
            return;
        }
        if self.is_running && self.start_time.is_none() {
            self.is_running = false;
        }
        if !self.is_running {
            self.start_time = None;
        }
    }
}

fn ms_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    (to - from).num_milliseconds().max(0) as u64
}

fn anchor_for(now: DateTime<Utc>, elapsed_ms: u64) -> DateTime<Utc> {
    let elapsed = i64::try_from(elapsed_ms).unwrap_or(i64::MAX);
    now - Duration::milliseconds(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task() -> Task {
        Task {
            id: "t1".into(),
            owner: "alice@example.com".into(),
            name: "Writing".into(),
            description: None,
            color: "#3B82F6".into(),
            total_time: 0,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            is_active: false,
        }
    }

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap() + Duration::milliseconds(ms)
    }

    #[test]
    fn status_is_derived_from_two_fields() {
        let mut state = TimerState::new();
        assert_eq!(state.status(), TimerStatus::Idle);

        assert!(state.begin(task(), at(0)));
        assert_eq!(state.status(), TimerStatus::Running);
        assert!(state.start_time.is_some());

        assert!(state.pause(at(1_000)));
        assert_eq!(state.status(), TimerStatus::Paused);
        assert!(state.start_time.is_none());
        assert!(state.current_task.is_some());
    }

    #[test]
    fn begin_refused_while_task_current() {
        let mut state = TimerState::new();
        state.begin(task(), at(0));
        state.pause(at(500));

        let before = state.clone();
        assert!(!state.begin(task(), at(900)));
        assert_eq!(state, before);
    }

    #[test]
    fn invalid_transitions_are_no_ops() {
        let mut state = TimerState::new();
        assert!(!state.pause(at(0)));
        assert!(!state.resume(at(0)));
        assert!(state.finish(at(0)).is_none());
        assert_eq!(state, TimerState::new());

        state.begin(task(), at(0));
        assert!(!state.resume(at(10)));
        state.pause(at(20));
        assert!(!state.pause(at(30)));
    }

    #[test]
    fn pause_resume_keeps_sub_second_remainder() {
        let mut state = TimerState::new();
        state.begin(task(), at(0));
        state.pause(at(1_500));
        state.resume(at(10_000));
        state.pause(at(11_500));
        state.resume(at(20_000));

        let run = state.finish(at(20_000)).unwrap();
        // 1.5s + 1.5s of running time
        assert_eq!(run.duration, 3);
        assert_eq!(run.end_time, at(20_000));
        assert_eq!(run.start_time, at(17_000));
        assert_eq!(state.status(), TimerStatus::Idle);
    }

    #[test]
    fn finish_from_paused_ignores_paused_time() {
        let mut state = TimerState::new();
        state.begin(task(), at(0));
        state.pause(at(65_900));

        let run = state.finish(at(3_600_000)).unwrap();
        assert_eq!(run.duration, 65);
        assert_eq!(run.task.id, "t1");
    }

    #[test]
    fn clock_going_backwards_clamps_to_zero() {
        let mut state = TimerState::new();
        state.begin(task(), at(5_000));
        let run = state.finish(at(0)).unwrap();
        assert_eq!(run.duration, 0);
    }

    #[test]
    fn normalize_repairs_inconsistent_snapshot() {
        let mut state = TimerState {
            is_running: true,
            current_task: Some(task()),
            start_time: None,
            elapsed_ms: 4_000,
        };
        state.normalize();
        assert_eq!(state.status(), TimerStatus::Paused);

        let mut orphan = TimerState {
            is_running: true,
            current_task: None,
            start_time: Some(at(0)),
            elapsed_ms: 10,
        };
        orphan.normalize();
        assert_eq!(orphan, TimerState::new());
    }
}
