pub mod clock;
pub mod commands;
pub mod controller;
pub mod state;
mod ticker;


pub use clock::{Clock, SystemClock};
pub use controller::{TimerEngine, TimerSnapshot};
pub use state::{FinishedRun, TimerState, TimerStatus};
