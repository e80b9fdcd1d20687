use std::path::PathBuf;

use structopt::StructOpt;

use crate::settings::StorageMode;

#[derive(Debug, StructOpt, PartialEq)]
pub enum TaskCommand {
    /// Create a task.
    Add {
        name: String,

        #[structopt(short, long)]
        description: Option<String>,

        /// Hex colour; a palette colour is picked when omitted.
        #[structopt(short, long)]
        color: Option<String>,
    },
    /// List tasks, newest first.
    List,
    /// Change a task's name, description or colour.
    Edit {
        /// Task id or a unique prefix of it.
        task: String,

        #[structopt(short, long)]
        name: Option<String>,

        /// An empty value clears the description.
        #[structopt(short, long)]
        description: Option<String>,

        #[structopt(short, long)]
        color: Option<String>,
    },
    /// Delete a task together with its time entries.
    Rm {
        /// Task id or a unique prefix of it.
        task: String,
    },
}

#[derive(Debug, StructOpt, PartialEq)]
pub enum Command {
    /// Write the settings file and register the owner.
    Init {
        /// sqlite (multi-user) or local (single-user JSON files).
        #[structopt(long)]
        storage: Option<StorageMode>,

        #[structopt(long)]
        owner: Option<String>,

        #[structopt(long)]
        display_name: Option<String>,
    },
    /// Manage tasks.
    Task {
        #[structopt(subcommand)]
        command: TaskCommand,
    },
    /// Start timing a task.
    Start {
        /// Task id or a unique prefix of it.
        task: String,

        /// Stop the current timer first and record its entry.
        #[structopt(long)]
        switch: bool,
    },
    /// Pause the running timer.
    Pause,
    /// Resume the paused timer.
    Resume,
    /// Stop the timer and record the entry.
    Stop {
        /// Description stored on the entry.
        #[structopt(short, long)]
        note: Option<String>,
    },
    /// Drop the in-flight timer without recording anything.
    Cancel,
    /// Show the timer.
    Status {
        /// Keep printing the elapsed time until the timer stops running.
        #[structopt(short, long)]
        follow: bool,
    },
    /// Today, this week and per-task totals.
    Stats,
    /// This week's top trackers.
    Leaderboard,
    /// Rebuild cached task totals from the entry log.
    Reconcile,
}

#[derive(Debug, StructOpt)]
#[structopt(name = "timetracker", about = "Track time spent on tasks.")]
pub struct CommandLineArgs {
    #[structopt(subcommand)]
    pub action: Command,

    /// Use a different data directory.
    #[structopt(parse(from_os_str), short = "D", long)]
    pub data_dir: Option<PathBuf>,
}
