#[macro_use]
extern crate prettytable;

mod cli;
pub mod db;
pub mod error;
pub mod models;
pub mod settings;
pub mod stats;
pub mod store;
pub mod tasks;
pub mod timer;
pub mod utils;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use structopt::StructOpt;

use cli::{Command, CommandLineArgs, TaskCommand};
use db::Database;
use settings::{SettingsStore, StorageMode, TrackerSettings, SETTINGS_FILE};
use store::{LocalStore, TimeStore};
use timer::{SystemClock, TimerEngine};

pub const DATABASE_FILE: &str = "timetracker.sqlite3";

/// Everything a command handler needs, opened once per invocation.
pub struct AppState {
    pub(crate) store: Arc<dyn TimeStore>,
    pub(crate) timer: TimerEngine,
    pub(crate) settings: TrackerSettings,
}

impl AppState {
    /// Opens the configured backend and rehydrates the owner's timer.
    pub async fn open(settings: TrackerSettings, data_dir: &Path) -> Result<Self> {
        let store = open_store(&settings, data_dir)?;
        let timer = TimerEngine::restore(
            settings.owner.clone(),
            store.clone(),
            Arc::new(SystemClock),
            settings.tick_interval(),
        )
        .await;

        Ok(Self {
            store,
            timer,
            settings,
        })
    }

    pub fn owner(&self) -> &str {
        &self.settings.owner
    }

    pub fn store(&self) -> &dyn TimeStore {
        self.store.as_ref()
    }
}

pub fn open_store(settings: &TrackerSettings, data_dir: &Path) -> Result<Arc<dyn TimeStore>> {
    let store: Arc<dyn TimeStore> = match settings.storage {
        StorageMode::Sqlite => Arc::new(Database::new(data_dir.join(DATABASE_FILE))?),
        StorageMode::Local => Arc::new(LocalStore::open(
            data_dir.to_path_buf(),
            &settings.owner,
            &settings.display_name,
        )?),
    };
    Ok(store)
}

fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("dev", "timetracker", "timetracker")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| anyhow!("failed to determine a data directory; pass --data-dir"))
}

pub async fn run() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(utils::logging::default_level())
        .parse_default_env()
        .init();

    let CommandLineArgs { action, data_dir } = CommandLineArgs::from_args();

    let data_dir = match data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;

    let settings_store = SettingsStore::new(data_dir.join(SETTINGS_FILE))?;

    let action = match action {
        Command::Init {
            storage,
            owner,
            display_name,
        } => {
            return tasks::commands::init(&settings_store, &data_dir, storage, owner, display_name)
                .await;
        }
        other => other,
    };

    let state = AppState::open(settings_store.get(), &data_dir).await?;
    log::debug!(
        "Using {:?} storage in {} for {}",
        state.settings.storage,
        data_dir.display(),
        state.owner()
    );

    let result = dispatch(&state, action).await;
    state.timer.shutdown().await;
    result
}

async fn dispatch(state: &AppState, action: Command) -> Result<()> {
    match action {
        Command::Init { .. } => Ok(()),
        Command::Task { command } => match command {
            TaskCommand::Add {
                name,
                description,
                color,
            } => tasks::commands::add_task(state, name, description, color).await,
            TaskCommand::List => tasks::commands::list_tasks(state).await,
            TaskCommand::Edit {
                task,
                name,
                description,
                color,
            } => tasks::commands::edit_task(state, &task, name, description, color).await,
            TaskCommand::Rm { task } => tasks::commands::remove_task(state, &task).await,
        },
        Command::Start { task, switch } => timer::commands::start_timer(state, &task, switch).await,
        Command::Pause => timer::commands::pause_timer(state).await,
        Command::Resume => timer::commands::resume_timer(state).await,
        Command::Stop { note } => timer::commands::stop_timer(state, note).await,
        Command::Cancel => timer::commands::cancel_timer(state).await,
        Command::Status { follow } => timer::commands::show_status(state, follow).await,
        Command::Stats => stats::commands::show_stats(state).await,
        Command::Leaderboard => stats::commands::show_leaderboard(state).await,
        Command::Reconcile => tasks::commands::reconcile_totals(state).await,
    }
}
