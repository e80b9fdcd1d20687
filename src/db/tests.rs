use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

use super::Database;
use crate::models::{NewTask, TaskUpdate, TimeEntry, User};
use crate::store::TimeStore;
use crate::timer::TimerState;

fn open() -> (TempDir, Database) {
    let dir = TempDir::new().unwrap();
    let db = Database::new(dir.path().join("timetracker.db")).unwrap();
    (dir, db)
}

fn new_task(name: &str) -> NewTask {
    NewTask {
        name: name.into(),
        description: None,
        color: Some("#3B82F6".into()),
    }
}

fn entry(id: &str, task_id: &str, owner: &str, secs_after: i64, duration: u64) -> TimeEntry {
    let start = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap() + Duration::seconds(secs_after);
    TimeEntry {
        id: id.into(),
        task_id: task_id.into(),
        owner: owner.into(),
        start_time: start,
        end_time: Some(start + Duration::seconds(duration as i64)),
        duration,
        description: None,
    }
}

#[tokio::test]
async fn tasks_round_trip_and_update_partially() {
    let (_dir, db) = open();
    let task = db.create_task("alice", new_task("Writing")).await.unwrap();

    let fetched = db.get_task("alice", &task.id).await.unwrap().unwrap();
    assert_eq!(fetched, task);
    assert!(db.get_task("bob", &task.id).await.unwrap().is_none());

    let update = TaskUpdate {
        description: Some("chapter 3".into()),
        ..TaskUpdate::default()
    };
    assert!(db.update_task("alice", &task.id, update).await.unwrap());
    assert!(!db
        .update_task("alice", "missing", TaskUpdate::default())
        .await
        .unwrap());

    let fetched = db.get_task("alice", &task.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Writing");
    assert_eq!(fetched.description.as_deref(), Some("chapter 3"));

    let clear = TaskUpdate {
        description: Some(String::new()),
        ..TaskUpdate::default()
    };
    assert!(db.update_task("alice", &task.id, clear).await.unwrap());
    let fetched = db.get_task("alice", &task.id).await.unwrap().unwrap();
    assert_eq!(fetched.description, None);
    assert_eq!(fetched.name, "Writing");
}

#[tokio::test]
async fn tasks_are_listed_newest_first() {
    let (_dir, db) = open();
    let first = db.create_task("alice", new_task("First")).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = db.create_task("alice", new_task("Second")).await.unwrap();

    let ids: Vec<String> = db
        .list_tasks("alice")
        .await
        .unwrap()
        .into_iter()
        .map(|task| task.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn add_task_time_accumulates() {
    let (_dir, db) = open();
    let task = db.create_task("alice", new_task("Writing")).await.unwrap();

    assert!(db.add_task_time("alice", &task.id, 90).await.unwrap());
    assert!(db.add_task_time("alice", &task.id, 30).await.unwrap());
    assert!(!db.add_task_time("bob", &task.id, 30).await.unwrap());

    let fetched = db.get_task("alice", &task.id).await.unwrap().unwrap();
    assert_eq!(fetched.total_time, 120);
}

#[tokio::test]
async fn entry_timestamps_keep_sub_second_precision() {
    let (_dir, db) = open();
    let task = db.create_task("alice", new_task("Writing")).await.unwrap();

    let mut record = entry("e1", &task.id, "alice", 0, 5);
    record.start_time = record.start_time + Duration::nanoseconds(123_456_789);
    db.create_time_entry(&record).await.unwrap();

    let entries = db.list_time_entries("alice").await.unwrap();
    assert_eq!(entries, vec![record]);
}

#[tokio::test]
async fn entries_since_spans_owners() {
    let (_dir, db) = open();
    let a = db.create_task("alice", new_task("A")).await.unwrap();
    let b = db.create_task("bob", new_task("B")).await.unwrap();

    db.create_time_entry(&entry("old", &a.id, "alice", -3600, 60)).await.unwrap();
    db.create_time_entry(&entry("a1", &a.id, "alice", 0, 60)).await.unwrap();
    db.create_time_entry(&entry("b1", &b.id, "bob", 10, 60)).await.unwrap();

    let since = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
    let ids: Vec<String> = db
        .list_entries_since(since)
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.id)
        .collect();
    assert_eq!(ids, vec!["a1", "b1"]);
}

#[tokio::test]
async fn deleting_a_task_cascades() {
    let (_dir, db) = open();
    let task = db.create_task("alice", new_task("Writing")).await.unwrap();
    db.create_time_entry(&entry("e1", &task.id, "alice", 0, 60)).await.unwrap();

    let mut state = TimerState::new();
    state.begin(task.clone(), Utc::now());
    db.save_timer_state("alice", &state).await.unwrap();

    assert!(db.delete_task("alice", &task.id).await.unwrap());
    assert!(!db.delete_task("alice", &task.id).await.unwrap());
    assert!(db.list_time_entries("alice").await.unwrap().is_empty());
    assert!(db.load_timer_state("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn timer_state_round_trips_and_clears() {
    let (_dir, db) = open();
    let task = db.create_task("alice", new_task("Writing")).await.unwrap();
    let now = Utc::now();

    let mut state = TimerState::new();
    state.begin(task.clone(), now);
    state.pause(now + Duration::milliseconds(2_500));
    db.save_timer_state("alice", &state).await.unwrap();

    let loaded = db.load_timer_state("alice").await.unwrap().unwrap();
    assert_eq!(loaded, state);

    state.resume(now + Duration::seconds(10));
    db.save_timer_state("alice", &state).await.unwrap();
    let loaded = db.load_timer_state("alice").await.unwrap().unwrap();
    assert!(loaded.is_running);
    assert_eq!(loaded.start_time, state.start_time);

    db.save_timer_state("alice", &TimerState::new()).await.unwrap();
    assert!(db.load_timer_state("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn users_upsert_keeps_identity_unique() {
    let (_dir, db) = open();
    let now = Utc::now();
    db.upsert_user(&User {
        identity: "alice".into(),
        display_name: "Alice".into(),
        created_at: now,
    })
    .await
    .unwrap();
    db.upsert_user(&User {
        identity: "alice".into(),
        display_name: "Alice L.".into(),
        created_at: now + Duration::days(1),
    })
    .await
    .unwrap();

    let users = db.list_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].created_at, now);
    assert_eq!(
        db.resolve_display_name("alice").await.unwrap().as_deref(),
        Some("Alice L.")
    );
    assert!(db.resolve_display_name("bob").await.unwrap().is_none());
}

#[tokio::test]
async fn reopening_keeps_data() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("timetracker.db");
    let task_id = {
        let db = Database::new(path.clone()).unwrap();
        db.create_task("alice", new_task("Writing")).await.unwrap().id
    };

    let db = Database::new(path).unwrap();
    assert!(db.get_task("alice", &task_id).await.unwrap().is_some());
}
